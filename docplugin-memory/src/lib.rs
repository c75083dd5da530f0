//! In-memory document database plugin for docplugin.
//!
//! This crate provides a thread-safe, in-memory implementation of the `DbPlugin` trait.
//! It uses an async-aware read-write lock around a single map of documents keyed by id.
//!
//! # Features
//!
//! - **Shared or private storage** - Plugins share the process-wide store by default, or
//!   can be bound to their own [`MemoryStore`]
//! - **Revision stamping** - Every add and update gets a new `"<generation>-<uuid>"` revision
//! - **Per-item bulk results** - Failed batch items are reported, never rolled back
//! - **Optional conflict detection** - Reject writes whose revision is stale
//!
//! # Quick Start
//!
//! ```ignore
//! use docplugin::{prelude::*, memory::MemoryDbPlugin};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(MemoryDbPlugin::builder().build().await?);
//!
//!     store
//!         .bulk_operations(BulkOperations::new().add(DbRecord::new("inv-1", "invoice")))
//!         .await?;
//!
//!     let invoices = store.all(Some(QueryParams::document_type("invoice"))).await?;
//!     assert_eq!(invoices.len(), 1);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docplugin_memory;

pub mod store;

pub use store::{MemoryDbPlugin, MemoryDbPluginBuilder, MemoryStore};
