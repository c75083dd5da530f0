//! Convenient re-exports of commonly used types from docplugin.
//!
//! ```ignore
//! use docplugin::prelude::*;
//! ```
//!
//! This provides access to:
//! - Document records and the typed document traits
//! - The plugin contract and builders
//! - Bulk write requests and responses
//! - Query parameters, options and error types

pub use docplugin_core::{
    bulk::{BulkOperations, BulkOperationsResponse, BulkOutcome, BulkSuccess, BulkError},
    document::{DbRecord, Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    params::{DbPluginOptions, QueryParams},
    plugin::{DbPlugin, DbPluginBuilder},
    revision::Revision,
    store::{DocumentStore, DynDocumentStore},
    typed::TypedDocuments,
};
