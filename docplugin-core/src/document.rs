//! Core types and traits for document representation and serialization.
//!
//! Plugins store [`DbRecord`]s: an id, a document type label, a revision and any number of
//! caller-defined fields. Application code usually works with its own structs through the
//! [`Document`] trait and converts to and from records with [`DocumentExt`].

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, to_value};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    revision::generation_of,
};

/// Serialized name of the document id field.
pub const ID_FIELD: &str = "_id";
/// Serialized name of the revision field.
pub const REV_FIELD: &str = "_rev";
/// Serialized name of the document type field.
pub const DOCUMENT_TYPE_FIELD: &str = "DocumentType";

/// An untyped document as held by a plugin.
///
/// The id, revision and type label are first-class; everything else lives in `fields`
/// and is flattened into the same level when serialized.
///
/// # Example
///
/// ```ignore
/// use docplugin::document::DbRecord;
///
/// let invoice = DbRecord::new("inv-1", "invoice")
///     .with_field("total", 120)
///     .with_field("customer", "acme");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbRecord {
    /// Unique identifier, assigned by the caller.
    #[serde(rename = "_id")]
    pub id: String,
    /// Caller-defined category label.
    #[serde(rename = "DocumentType")]
    pub document_type: String,
    /// Revision tag, assigned by the plugin on every add/update.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Additional caller-defined fields, opaque to the plugin.
    #[serde(flatten)]
    pub fields: bson::Document,
}

impl DbRecord {
    /// Creates a record with no revision and no extra fields.
    pub fn new(id: impl Into<String>, document_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_type: document_type.into(),
            rev: None,
            fields: bson::Document::new(),
        }
    }

    /// Sets a caller-defined field, replacing any previous value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the revision this record is based on.
    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    /// Returns a caller-defined field by name.
    pub fn field(&self, key: &str) -> Option<&Bson> {
        self.fields.get(key)
    }

    /// Returns the generation of the current revision, or `0` if there is none.
    pub fn generation(&self) -> u64 {
        self.rev
            .as_deref()
            .map(generation_of)
            .unwrap_or(0)
    }

    /// Converts this record to a JSON value.
    pub fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }
}

/// Trait implemented by application types that are stored through a plugin.
///
/// The type's serialized form must carry its id under `_id`. It may carry its revision
/// under `_rev` (to read back the revision the plugin assigned) and its type label under
/// `DocumentType`; a missing type label is filled in from [`Document::document_type`].
///
/// # Example
///
/// ```ignore
/// use docplugin::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Invoice {
///     #[serde(rename = "_id")]
///     pub id: String,
///     #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
///     pub rev: Option<String>,
///     pub total: i64,
/// }
///
/// impl Document for Invoice {
///     fn id(&self) -> &str { &self.id }
///     fn document_type() -> &'static str { "invoice" }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns this document's unique identifier.
    fn id(&self) -> &str;

    /// Returns the document type label shared by all values of this type.
    fn document_type() -> &'static str;
}

/// Conversion utilities between typed documents and [`DbRecord`]s.
///
/// Automatically implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document into a record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the serialized form lacks an `_id`.
    fn to_record(&self) -> DocumentStoreResult<DbRecord>;

    /// Creates a document from a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record's fields do not match the document's structure.
    fn from_record(record: DbRecord) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_record(&self) -> DocumentStoreResult<DbRecord> {
        let mut doc = match serialize_to_bson(self)? {
            Bson::Document(doc) => doc,
            other => {
                return Err(DocumentStoreError::InvalidDocument(format!(
                    "expected a document for id {}, got {:?}",
                    self.id(),
                    other.element_type(),
                )));
            }
        };

        if !doc.contains_key(DOCUMENT_TYPE_FIELD) {
            doc.insert(DOCUMENT_TYPE_FIELD, D::document_type());
        }

        Ok(deserialize_from_bson(Bson::Document(doc))?)
    }

    fn from_record(record: DbRecord) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(serialize_to_bson(&record)?)?)
    }
}
