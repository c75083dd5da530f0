//! Error types and result types for document plugin operations.
//!
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations. Errors are
//! cloneable so that a single failure can be recorded in a bulk response and logged.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document plugin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The requested document was not found. Carries the first missing id.
    #[error("Document not found for id: {0}")]
    DocumentNotFound(String),
    /// The document has an invalid structure (for example an empty id).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The revision supplied with a write does not match the stored revision.
    #[error("Revision conflict for document {id}: expected {expected:?}, found {actual:?}")]
    RevisionConflict {
        id: String,
        expected: Option<String>,
        actual: Option<String>,
    },
}

/// A specialized `Result` type for document plugin operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
