//! Typed access to documents of a single [`Document`] type.
//!
//! [`TypedDocuments`] converts between application structs and [`DbRecord`]s so callers
//! never handle records directly.
//!
//! # Example
//!
//! ```ignore
//! let invoices = store.typed::<Invoice>();
//!
//! let response = invoices
//!     .bulk_operations(BulkOperations::new().add(invoice))
//!     .await?;
//! let stored = invoices.get_strict(["inv-1"]).await?;
//! ```

use std::marker::PhantomData;
use tracing::warn;

use crate::{
    bulk::{BulkOperations, BulkOperationsResponse, BulkOutcome},
    document::{DbRecord, Document, DocumentExt},
    error::DocumentStoreResult,
    params::QueryParams,
    plugin::DbPlugin,
    store::collect_ids,
};

#[derive(Debug)]
pub struct TypedDocuments<'a, P: DbPlugin, D: Document> {
    plugin: &'a P,
    _marker: PhantomData<D>,
}

impl<'a, P: DbPlugin, D: Document> TypedDocuments<'a, P, D> {
    pub(crate) fn new(plugin: &'a P) -> Self {
        Self { plugin, _marker: PhantomData }
    }

    /// Returns the document type label this view reads and writes.
    pub fn document_type(&self) -> &'static str {
        D::document_type()
    }

    /// Converts this view to a different document type over the same plugin.
    pub fn with_type<T: Document>(&self) -> TypedDocuments<'a, P, T> {
        TypedDocuments::new(self.plugin)
    }

    /// Returns every stored document whose type label is `D::document_type()`.
    ///
    /// # Errors
    ///
    /// Returns an error if a matching record cannot be converted to `D`.
    pub async fn all(&self) -> DocumentStoreResult<Vec<D>> {
        self.plugin
            .all(Some(QueryParams::document_type(D::document_type())))
            .await?
            .into_iter()
            .map(D::from_record)
            .collect()
    }

    /// Retrieves the documents that exist among `ids`, in request order.
    ///
    /// # Errors
    ///
    /// Returns an error if a found record cannot be converted to `D`.
    pub async fn get<I, S>(&self, ids: I) -> DocumentStoreResult<Vec<D>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugin
            .get(collect_ids(ids))
            .await?
            .into_iter()
            .map(D::from_record)
            .collect()
    }

    /// Retrieves documents by id, failing on the first id that does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) for
    /// the first missing id, or a serialization error if a record cannot be converted.
    pub async fn get_strict<I, S>(&self, ids: I) -> DocumentStoreResult<Vec<D>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugin
            .get_strict(collect_ids(ids))
            .await?
            .into_iter()
            .map(D::from_record)
            .collect()
    }

    /// Applies a batch of typed writes.
    ///
    /// Documents that cannot be converted to records never reach the plugin; they are
    /// reported as failed items alongside the plugin's own results.
    pub async fn bulk_operations(
        &self,
        operations: BulkOperations<D>,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        let mut rejected = BulkOperationsResponse::default();

        let records = BulkOperations {
            adds: to_records(operations.adds, &mut rejected),
            removes: to_records(operations.removes, &mut rejected),
            updates: to_records(operations.updates, &mut rejected),
        };

        let mut response = self.plugin
            .bulk_operations(records)
            .await?;
        response.merge(rejected);

        Ok(response)
    }
}

fn to_records<D: Document>(documents: Vec<D>, rejected: &mut BulkOperationsResponse) -> Vec<DbRecord> {
    documents
        .into_iter()
        .filter_map(|document| match document.to_record() {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(id = document.id(), %error, "document could not be converted to a record");
                rejected.push(BulkOutcome::failure(document.id(), None, error));
                None
            }
        })
        .collect()
}
