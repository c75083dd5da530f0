//! The document database plugin contract.
//!
//! # Overview
//!
//! The [`DbPlugin`] trait is the capability set a document database layer expects from a
//! storage plugin: whole-store reads, id lookups (lenient and strict), batched writes with
//! per-item results, and teardown. Implementations are required to be thread-safe
//! (`Send + Sync`).
//!
//! # Traits
//!
//! - [`DbPlugin`]: The core trait for plugins
//! - [`DynDbPlugin`]: A trait for dynamic dispatch over plugin implementations
//! - [`DbPluginBuilder`]: Factory trait for creating plugin instances
//!
//! # Examples
//!
//! ```ignore
//! use docplugin::plugin::DbPlugin;
//! use docplugin::document::DbRecord;
//! use docplugin::bulk::BulkOperations;
//!
//! let plugin = MyPluginImpl::new();
//!
//! let response = plugin
//!     .bulk_operations(BulkOperations::new().add(DbRecord::new("inv-1", "invoice")))
//!     .await?;
//! assert_eq!(response.successes_count, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::{any::Any, fmt::Debug};

use crate::{
    bulk::{BulkOperations, BulkOperationsResponse},
    document::DbRecord,
    error::DocumentStoreResult,
    params::{DbPluginOptions, QueryParams},
};

/// Abstract interface for document database plugins.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. The concurrency model is implementation-specific but should be documented
/// by the implementer.
///
/// # Error Handling
///
/// Every operation returns [`DocumentStoreResult<T>`](crate::error::DocumentStoreResult).
/// Only [`get_strict`](DbPlugin::get_strict) has a contractual failure
/// ([`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)); per-item write
/// failures are reported inside the [`BulkOperationsResponse`] rather than as an `Err`.
#[async_trait]
pub trait DbPlugin: Send + Sync + Debug {
    /// Returns the options this plugin was constructed with.
    fn options(&self) -> &DbPluginOptions;

    /// Removes every document.
    ///
    /// The effect is visible to every plugin sharing the same storage.
    async fn destroy(&self) -> DocumentStoreResult<()>;

    /// Returns all documents, optionally restricted to one document type.
    ///
    /// Order is unspecified. Returns an empty vector if nothing matches.
    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>>;

    /// Retrieves documents by id, in request order.
    ///
    /// Ids that are not present are silently skipped.
    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>>;

    /// Retrieves documents by id, in request order, failing on the first missing id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) with
    /// the first id (in request order) that is absent. Later ids are not looked up.
    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>>;

    /// Applies a batch of adds, removes and updates, in that order.
    ///
    /// Each item is applied independently. Adds and updates are stamped with a new
    /// revision; removes keep the revision they were given. Items that fail are reported
    /// in [`BulkOperationsResponse::errors`] and do not stop the batch. Nothing is rolled
    /// back.
    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse>;
}

#[async_trait]
impl<P> DbPlugin for &P
where
    P: DbPlugin,
{
    fn options(&self) -> &DbPluginOptions {
        P::options(*self)
    }

    async fn destroy(&self) -> DocumentStoreResult<()> {
        P::destroy(*self).await
    }

    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>> {
        P::all(*self, params).await
    }

    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        P::get(*self, ids).await
    }

    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        P::get_strict(*self, ids).await
    }

    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        P::bulk_operations(*self, operations).await
    }
}

#[async_trait]
pub trait DynDbPlugin: Send + Sync + Debug {
    fn options(&self) -> &DbPluginOptions;
    async fn destroy(&self) -> DocumentStoreResult<()>;
    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>>;
    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>>;
    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>>;
    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<P: DbPlugin + 'static> DynDbPlugin for P {
    fn options(&self) -> &DbPluginOptions {
        DbPlugin::options(self)
    }

    async fn destroy(&self) -> DocumentStoreResult<()> {
        DbPlugin::destroy(self).await
    }

    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>> {
        DbPlugin::all(self, params).await
    }

    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        DbPlugin::get(self, ids).await
    }

    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        DbPlugin::get_strict(self, ids).await
    }

    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        DbPlugin::bulk_operations(self, operations).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Lets a boxed dynamic plugin be used wherever a [`DbPlugin`] is expected.
#[async_trait]
impl DbPlugin for Box<dyn DynDbPlugin> {
    fn options(&self) -> &DbPluginOptions {
        DynDbPlugin::options(&**self)
    }

    async fn destroy(&self) -> DocumentStoreResult<()> {
        DynDbPlugin::destroy(&**self).await
    }

    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>> {
        DynDbPlugin::all(&**self, params).await
    }

    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        DynDbPlugin::get(&**self, ids).await
    }

    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        DynDbPlugin::get_strict(&**self, ids).await
    }

    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        DynDbPlugin::bulk_operations(&**self, operations).await
    }
}

#[async_trait]
pub trait DbPluginBuilder {
    type Plugin: DbPlugin;

    async fn build(self) -> DocumentStoreResult<Self::Plugin>;
}
