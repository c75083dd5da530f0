//! Main document store interface wrapping a plugin.
//!
//! - [`DocumentStore`] - Store bound to a specific plugin implementation
//! - [`DynDocumentStore`] - Store over a boxed plugin for runtime plugin selection
//!
//! # Example
//!
//! ```ignore
//! use docplugin::store::DocumentStore;
//!
//! let store = DocumentStore::new(plugin);
//! let invoices = store.typed::<Invoice>();
//! let all_invoices = invoices.all().await?;
//! ```

use crate::{
    bulk::{BulkOperations, BulkOperationsResponse},
    document::{DbRecord, Document},
    error::DocumentStoreResult,
    params::{DbPluginOptions, QueryParams},
    plugin::{self, DbPlugin},
    typed::TypedDocuments,
};

/// A document store bound to a specific plugin implementation.
///
/// Mirrors the plugin contract and adds typed access through [`DocumentStore::typed`].
///
/// # Type Parameters
///
/// * `P` - The plugin implementation type
#[derive(Debug)]
pub struct DocumentStore<P: DbPlugin> {
    plugin: P,
}

/// A document store over a dynamically dispatched plugin.
pub type DynDocumentStore = DocumentStore<Box<dyn plugin::DynDbPlugin>>;

impl<P: DbPlugin> DocumentStore<P> {
    /// Creates a new document store with the given plugin.
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    /// Returns the underlying plugin.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Returns the options the plugin was constructed with.
    pub fn options(&self) -> &DbPluginOptions {
        self.plugin.options()
    }

    /// Gets a typed view over documents of type `D`.
    pub fn typed<'a, D: Document>(&'a self) -> TypedDocuments<'a, P, D> {
        TypedDocuments::new(&self.plugin)
    }

    /// Removes every document from the plugin's storage.
    pub async fn destroy(&self) -> DocumentStoreResult<()> {
        self.plugin.destroy().await
    }

    /// Returns all documents, optionally restricted by `params`.
    pub async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>> {
        self.plugin.all(params).await
    }

    /// Retrieves the documents that exist among `ids`, in request order.
    pub async fn get<I, S>(&self, ids: I) -> DocumentStoreResult<Vec<DbRecord>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugin
            .get(collect_ids(ids))
            .await
    }

    /// Retrieves documents by id, failing on the first id that does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// naming the first missing id.
    pub async fn get_strict<I, S>(&self, ids: I) -> DocumentStoreResult<Vec<DbRecord>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugin
            .get_strict(collect_ids(ids))
            .await
    }

    /// Applies a batch of writes. See [`DbPlugin::bulk_operations`].
    pub async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        self.plugin
            .bulk_operations(operations)
            .await
    }
}

impl<P: DbPlugin + 'static> DocumentStore<P> {
    /// Converts this store into one over a dynamically dispatched plugin.
    pub fn into_dyn(self) -> DynDocumentStore {
        DocumentStore::new(Box::new(self.plugin) as Box<dyn plugin::DynDbPlugin>)
    }
}

impl DynDocumentStore {
    /// Returns the plugin as its concrete type, if it is a `P`.
    pub fn plugin_as<P: DbPlugin + 'static>(&self) -> Option<&P> {
        plugin::DynDbPlugin::as_any(&*self.plugin).downcast_ref::<P>()
    }

    /// Converts back into a store over the concrete plugin type, if it is a `P`.
    pub fn into_static<P: DbPlugin + 'static>(self) -> Option<DocumentStore<P>> {
        plugin::DynDbPlugin::into_any(self.plugin)
            .downcast::<P>()
            .ok()
            .map(|plugin| DocumentStore::new(*plugin))
    }
}

pub(crate) fn collect_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter()
        .map(Into::into)
        .collect()
}
