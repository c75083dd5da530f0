//! Core contract for document database plugins.
//!
//! This crate is the core of the docplugin project and provides:
//!
//! - **Plugin contract** ([`plugin`]) - The `DbPlugin` trait every storage plugin implements
//! - **Documents** ([`document`]) - Untyped records and the typed `Document` trait
//! - **Revisions** ([`revision`]) - Generation-numbered revision tags
//! - **Bulk writes** ([`bulk`]) - Batches of adds/removes/updates and their per-item results
//! - **Parameters** ([`params`]) - Query filters and plugin options
//! - **Document store** ([`store`], [`typed`]) - Facade over a plugin with typed access
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docplugin::{Document, DocumentStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Invoice {
//!     #[serde(rename = "_id")]
//!     pub id: String,
//!     pub total: i64,
//! }
//!
//! impl Document for Invoice {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn document_type() -> &'static str {
//!         "invoice"
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docplugin_core;

pub mod bulk;
pub mod document;
pub mod error;
pub mod params;
pub mod plugin;
pub mod revision;
pub mod store;
pub mod typed;
