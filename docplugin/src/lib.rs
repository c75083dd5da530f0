//! Main docplugin crate providing an in-memory document database plugin.
//!
//! This crate is the primary entry point for users of docplugin. It re-exports the
//! plugin contract from `docplugin-core` and the in-memory plugin from `docplugin-memory`.
//!
//! # Features
//!
//! - **Plugin contract** - `all`, `get`, `get_strict`, `bulk_operations` and `destroy`
//! - **Revisioned writes** - Every add/update is stamped with a `"<generation>-<uuid>"` revision
//! - **Best-effort batches** - Per-item success and error reporting with no rollback
//! - **Typed documents** - Work with your own Serde structs through the `Document` trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docplugin::{prelude::*, memory::{MemoryDbPlugin, MemoryStore}};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Invoice {
//!     #[serde(rename = "_id")]
//!     pub id: String,
//!     #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
//!     pub rev: Option<String>,
//!     pub total: i64,
//! }
//!
//! impl Document for Invoice {
//!     fn id(&self) -> &str { &self.id }
//!     fn document_type() -> &'static str { "invoice" }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let plugin = MemoryDbPlugin::builder()
//!         .store(MemoryStore::new())
//!         .build()
//!         .await
//!         .unwrap();
//!     let store = DocumentStore::new(plugin);
//!     let invoices = store.typed::<Invoice>();
//!
//!     let response = invoices
//!         .bulk_operations(BulkOperations::new().add(Invoice {
//!             id: "inv-1".to_string(),
//!             rev: None,
//!             total: 120,
//!         }))
//!         .await
//!         .unwrap();
//!     println!("Stored with revision {:?}", response.successes["inv-1"].rev);
//!
//!     let stored = invoices.get_strict(["inv-1"]).await.unwrap();
//!     println!("Fetched invoices: {:?}", stored);
//!
//!     store.destroy().await.unwrap();
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! A `DocumentStore` can be converted into a dynamically dispatched store with `into_dyn`,
//! for code that picks its plugin at runtime. The concrete plugin can be recovered with
//! `plugin_as` or `into_static`.
//!
//! ```ignore
//! let dyn_store = DocumentStore::new(MemoryDbPlugin::new(DbPluginOptions::default())).into_dyn();
//! let plugin = dyn_store.plugin_as::<MemoryDbPlugin>().unwrap();
//! ```

pub mod prelude;

pub use docplugin_core::{bulk, document, error, params, plugin, revision, store, typed};

// Re-export BSON types for convenience
pub use bson;

/// In-memory plugin implementations.
pub mod memory {
    pub use docplugin_memory::{MemoryDbPlugin, MemoryDbPluginBuilder, MemoryStore};
}
