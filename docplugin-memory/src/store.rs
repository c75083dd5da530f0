//! In-memory plugin implementation.
//!
//! Documents are kept as [`DbRecord`]s in a `HashMap` keyed by id, behind an async-aware
//! read-write lock.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use tracing::{debug, warn};

use docplugin_core::{
    bulk::{BulkOperationKind, BulkOperations, BulkOperationsResponse, BulkOutcome},
    document::DbRecord,
    error::{DocumentStoreError, DocumentStoreResult},
    params::{DbPluginOptions, QueryParams},
    plugin::{DbPlugin, DbPluginBuilder},
    revision::Revision,
};

type RecordMap = HashMap<String, DbRecord>;

static SHARED_STORE: LazyLock<MemoryStore> = LazyLock::new(MemoryStore::new);


/// The storage behind one or more [`MemoryDbPlugin`]s.
///
/// `MemoryStore` is cheap to clone; clones share the same map. Use
/// [`MemoryStore::shared`] for the process-wide store or [`MemoryStore::new`] for a
/// private one.
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    records: Arc<RwLock<RecordMap>>,
}

impl MemoryStore {
    /// Creates a new, empty store that is not shared with anything else.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(RecordMap::new())),
        }
    }

    /// Returns a handle to the process-wide store.
    pub fn shared() -> Self {
        SHARED_STORE.clone()
    }

    /// Returns `true` if both handles refer to the same underlying map.
    pub fn same_store(&self, other: &MemoryStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if no documents are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}


/// In-memory document database plugin.
///
/// Plugins created with [`MemoryDbPlugin::new`] all use the process-wide
/// [`MemoryStore::shared`] store, so writes through one are visible through every other
/// and [`destroy`](DbPlugin::destroy) clears them all. Bind a plugin to its own
/// [`MemoryStore`] with [`MemoryDbPlugin::with_store`] or the builder to isolate it.
///
/// # Concurrency
///
/// Reads take the read lock. `destroy` and `bulk_operations` take the write lock, and a
/// whole batch is applied under one guard. A batch is still not atomic: items that
/// succeeded before a failed item stay applied.
///
/// # Revisions
///
/// Every add and update is stamped with [`Revision::next`] of the stored revision, so an
/// id's generation grows by one per write no matter what the caller sends. The caller's
/// revision only seeds the generation when the id is not stored yet. By default the
/// caller's revision is not compared with the stored one (last writer wins). With conflict detection enabled through
/// [`MemoryDbPluginBuilder::conflict_detection`], mismatches fail the item with
/// [`DocumentStoreError::RevisionConflict`].
///
/// # Example
///
/// ```ignore
/// use docplugin_memory::{MemoryDbPlugin, MemoryStore};
/// use docplugin_core::{bulk::BulkOperations, document::DbRecord, params::DbPluginOptions, plugin::DbPlugin};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let plugin = MemoryDbPlugin::with_store(MemoryStore::new(), DbPluginOptions::default());
///
///     let response = plugin
///         .bulk_operations(BulkOperations::new().add(DbRecord::new("inv-1", "invoice")))
///         .await?;
///     assert_eq!(response.successes_count, 1);
///
///     let docs = plugin.get(vec!["inv-1".to_string()]).await?;
///     assert_eq!(docs.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct MemoryDbPlugin {
    options: DbPluginOptions,
    store: MemoryStore,
    conflict_detection: bool,
}

impl MemoryDbPlugin {
    /// Creates a plugin over the process-wide store.
    pub fn new(options: DbPluginOptions) -> Self {
        Self::with_store(MemoryStore::shared(), options)
    }

    /// Creates a plugin over the given store.
    pub fn with_store(store: MemoryStore, options: DbPluginOptions) -> Self {
        Self {
            options,
            store,
            conflict_detection: false,
        }
    }

    /// Creates a builder for configuring a plugin.
    pub fn builder() -> MemoryDbPluginBuilder {
        MemoryDbPluginBuilder::default()
    }

    /// Returns the store this plugin reads and writes.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Returns `true` if writes are checked against the stored revision.
    pub fn conflict_detection(&self) -> bool {
        self.conflict_detection
    }

    fn apply(&self, records: &mut RecordMap, kind: BulkOperationKind, record: DbRecord) -> BulkOutcome {
        let id = record.id.clone();
        let rev = record.rev.clone();

        let result = match kind {
            BulkOperationKind::Add | BulkOperationKind::Update => self.write(records, kind, record),
            BulkOperationKind::Remove => self.remove(records, record),
        };

        match result {
            Ok(rev) => BulkOutcome::success(id, rev),
            Err(error) => {
                warn!(%kind, id = %id, %error, "bulk item failed");
                BulkOutcome::failure(id, rev, error)
            }
        }
    }

    fn write(
        &self,
        records: &mut RecordMap,
        kind: BulkOperationKind,
        mut record: DbRecord,
    ) -> DocumentStoreResult<Option<String>> {
        validate(&record)?;

        if self.conflict_detection {
            check_write_conflict(records.get(&record.id), kind, &record)?;
        }

        let previous = records
            .get(&record.id)
            .and_then(|stored| stored.rev.as_deref())
            .or(record.rev.as_deref());
        let rev = Revision::next(previous).to_string();
        record.rev = Some(rev.clone());
        records.insert(record.id.clone(), record);

        Ok(Some(rev))
    }

    fn remove(&self, records: &mut RecordMap, record: DbRecord) -> DocumentStoreResult<Option<String>> {
        validate(&record)?;

        if self.conflict_detection {
            if let Some(stored) = records.get(&record.id) {
                if stored.rev != record.rev {
                    return Err(conflict(&record, stored.rev.clone()));
                }
            }
        }

        // Removing an id that is not stored is a successful no-op.
        records.remove(&record.id);

        Ok(record.rev)
    }
}

fn validate(record: &DbRecord) -> DocumentStoreResult<()> {
    if record.id.is_empty() {
        return Err(DocumentStoreError::InvalidDocument(format!(
            "document of type {:?} has an empty id",
            record.document_type,
        )));
    }

    Ok(())
}

fn check_write_conflict(
    stored: Option<&DbRecord>,
    kind: BulkOperationKind,
    record: &DbRecord,
) -> DocumentStoreResult<()> {
    match (kind, stored) {
        (BulkOperationKind::Add, Some(stored)) => Err(conflict(record, stored.rev.clone())),
        (BulkOperationKind::Update, None) => Err(conflict(record, None)),
        (BulkOperationKind::Update, Some(stored)) if stored.rev != record.rev => {
            Err(conflict(record, stored.rev.clone()))
        }
        _ => Ok(()),
    }
}

fn conflict(record: &DbRecord, actual: Option<String>) -> DocumentStoreError {
    DocumentStoreError::RevisionConflict {
        id: record.id.clone(),
        expected: record.rev.clone(),
        actual,
    }
}


#[async_trait]
impl DbPlugin for MemoryDbPlugin {
    fn options(&self) -> &DbPluginOptions {
        &self.options
    }

    async fn destroy(&self) -> DocumentStoreResult<()> {
        let mut records = self.store.records.write().await;
        debug!(documents = records.len(), "destroying memory store");
        records.clear();

        Ok(())
    }

    async fn all(&self, params: Option<QueryParams>) -> DocumentStoreResult<Vec<DbRecord>> {
        let records = self.store.records.read().await;
        let params = params.unwrap_or_default();

        Ok(
            records
                .values()
                .filter(|record| params.matches(&record.document_type))
                .cloned()
                .collect()
        )
    }

    async fn get(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        let records = self.store.records.read().await;

        Ok(
            ids.iter()
                .filter_map(|id| records.get(id).cloned())
                .collect()
        )
    }

    async fn get_strict(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<DbRecord>> {
        let records = self.store.records.read().await;

        // Collecting into a `Result` stops at the first missing id.
        ids.into_iter()
            .map(|id| match records.get(&id) {
                Some(record) => Ok(record.clone()),
                None => {
                    debug!(id = %id, "strict lookup missed");
                    Err(DocumentStoreError::DocumentNotFound(id))
                }
            })
            .collect()
    }

    async fn bulk_operations(
        &self,
        operations: BulkOperations,
    ) -> DocumentStoreResult<BulkOperationsResponse> {
        let BulkOperations { adds, removes, updates } = operations;
        debug!(
            adds = adds.len(),
            removes = removes.len(),
            updates = updates.len(),
            "applying bulk operations",
        );

        let mut records = self.store.records.write().await;

        let response = adds
            .into_iter()
            .map(|record| (BulkOperationKind::Add, record))
            .chain(removes.into_iter().map(|record| (BulkOperationKind::Remove, record)))
            .chain(updates.into_iter().map(|record| (BulkOperationKind::Update, record)))
            .map(|(kind, record)| self.apply(&mut records, kind, record))
            .collect::<BulkOperationsResponse>();

        debug!(
            successes = response.successes_count,
            errors = response.errors_count,
            "bulk operations applied",
        );

        Ok(response)
    }
}


/// Builder for constructing [`MemoryDbPlugin`] instances.
///
/// # Example
///
/// ```ignore
/// use docplugin_memory::{MemoryDbPlugin, MemoryStore};
/// use docplugin_core::plugin::DbPluginBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let plugin = MemoryDbPlugin::builder()
///         .db_name("ledger")
///         .store(MemoryStore::new())
///         .conflict_detection(true)
///         .build()
///         .await
///         .unwrap();
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemoryDbPluginBuilder {
    options: DbPluginOptions,
    store: Option<MemoryStore>,
    conflict_detection: bool,
}

impl MemoryDbPluginBuilder {
    /// Sets the options passed through to the plugin.
    pub fn options(mut self, options: DbPluginOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the database name in the plugin options.
    pub fn db_name(mut self, db_name: impl Into<String>) -> Self {
        self.options.db_name = Some(db_name.into());
        self
    }

    /// Binds the plugin to `store` instead of the process-wide store.
    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Enables checking the caller's revision against the stored revision on writes.
    pub fn conflict_detection(mut self, enabled: bool) -> Self {
        self.conflict_detection = enabled;
        self
    }
}

#[async_trait]
impl DbPluginBuilder for MemoryDbPluginBuilder {
    type Plugin = MemoryDbPlugin;

    async fn build(self) -> DocumentStoreResult<Self::Plugin> {
        Ok(MemoryDbPlugin {
            options: self.options,
            store: self.store.unwrap_or_else(MemoryStore::shared),
            conflict_detection: self.conflict_detection,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use docplugin_core::revision::generation_of;

    fn isolated() -> MemoryDbPlugin {
        MemoryDbPlugin::with_store(MemoryStore::new(), DbPluginOptions::default())
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    async fn add_all(plugin: &MemoryDbPlugin, records: Vec<DbRecord>) -> BulkOperationsResponse {
        plugin
            .bulk_operations(BulkOperations { adds: records, ..Default::default() })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn added_document_is_returned_with_assigned_revision() {
        let plugin = isolated();
        let response = add_all(&plugin, vec![DbRecord::new("a", "invoice").with_field("total", 10)]).await;

        let docs = plugin.get(ids(&["a"])).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[0].field("total"), Some(&bson::Bson::Int32(10)));
        assert_eq!(docs[0].rev, response.successes["a"].rev);
        assert_eq!(docs[0].generation(), 1);
    }

    #[tokio::test]
    async fn get_skips_missing_ids_and_keeps_request_order() {
        let plugin = isolated();
        add_all(&plugin, vec![DbRecord::new("a", "t"), DbRecord::new("b", "t"), DbRecord::new("c", "t")]).await;

        let docs = plugin.get(ids(&["c", "missing", "a"])).await.unwrap();
        let found = docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>();

        assert_eq!(found, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn get_strict_fails_on_first_missing_id() {
        let plugin = isolated();
        add_all(&plugin, vec![DbRecord::new("a", "t")]).await;

        let err = plugin
            .get_strict(ids(&["a", "x", "y"]))
            .await
            .unwrap_err();

        assert_eq!(err, DocumentStoreError::DocumentNotFound("x".to_string()));
    }

    #[tokio::test]
    async fn get_strict_returns_all_when_present() {
        let plugin = isolated();
        add_all(&plugin, vec![DbRecord::new("a", "t"), DbRecord::new("b", "t")]).await;

        let docs = plugin.get_strict(ids(&["b", "a"])).await.unwrap();

        assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn destroy_empties_the_store() {
        let plugin = isolated();
        add_all(&plugin, vec![DbRecord::new("a", "t"), DbRecord::new("b", "u")]).await;

        plugin.destroy().await.unwrap();

        assert!(plugin.all(None).await.unwrap().is_empty());
        assert!(plugin.store().is_empty().await);
    }

    #[tokio::test]
    async fn all_filters_by_exact_document_type() {
        let plugin = isolated();
        add_all(&plugin, vec![
            DbRecord::new("i1", "invoice"),
            DbRecord::new("i2", "invoice"),
            DbRecord::new("i3", "invoice"),
            DbRecord::new("r1", "receipt"),
            DbRecord::new("r2", "receipt"),
        ])
        .await;

        let mut invoices = plugin
            .all(Some(QueryParams::document_type("invoice")))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect::<Vec<_>>();
        invoices.sort();

        assert_eq!(invoices, vec!["i1", "i2", "i3"]);
        assert_eq!(plugin.all(None).await.unwrap().len(), 5);
        assert!(plugin.all(Some(QueryParams::document_type("Invoice"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_then_update_increments_generation() {
        let plugin = isolated();
        let added = add_all(&plugin, vec![DbRecord::new("x", "t")]).await;
        let first = added.successes["x"].rev.clone().unwrap();

        let updated = plugin
            .bulk_operations(BulkOperations::new().update(DbRecord::new("x", "t").with_rev(first.clone())))
            .await
            .unwrap();
        let second = updated.successes["x"].rev.clone().unwrap();

        assert_eq!(generation_of(&first), 1);
        assert_eq!(generation_of(&second), 2);
        assert_ne!(first.split_once('-').unwrap().1, second.split_once('-').unwrap().1);
    }

    #[tokio::test]
    async fn mixed_batch_counts_every_item() {
        let plugin = isolated();
        let response = plugin
            .bulk_operations(
                BulkOperations::new()
                    .add(DbRecord::new("a", "t"))
                    .add(DbRecord::new("b", "t"))
                    .remove(DbRecord::new("ghost", "t").with_rev("3-old"))
                    .update(DbRecord::new("c", "t")),
            )
            .await
            .unwrap();

        assert_eq!(response.successes_count, 4);
        assert_eq!(response.errors_count, 0);
        assert_eq!(response.successes["ghost"].rev.as_deref(), Some("3-old"));
        assert_eq!(plugin.store().len().await, 3);
    }

    #[tokio::test]
    async fn removes_run_after_adds_and_before_updates() {
        let plugin = isolated();
        let response = plugin
            .bulk_operations(
                BulkOperations::new()
                    .add(DbRecord::new("a", "t"))
                    .remove(DbRecord::new("a", "t"))
                    .update(DbRecord::new("b", "t"))
                    .remove(DbRecord::new("b", "t")),
            )
            .await
            .unwrap();

        let docs = plugin.all(None).await.unwrap();

        assert_eq!(response.successes_count, 4);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "b");
    }

    #[tokio::test]
    async fn invalid_item_is_reported_and_batch_continues() {
        let plugin = isolated();
        let response = plugin
            .bulk_operations(
                BulkOperations::new()
                    .add(DbRecord::new("a", "t"))
                    .add(DbRecord::new("", "t").with_rev("1-x"))
                    .add(DbRecord::new("b", "t")),
            )
            .await
            .unwrap();

        assert_eq!(response.successes_count, 2);
        assert_eq!(response.errors_count, 1);

        let failure = &response.errors[""];
        assert!(!failure.ok);
        assert_eq!(failure.rev.as_deref(), Some("1-x"));
        assert!(matches!(failure.error, DocumentStoreError::InvalidDocument(_)));
        assert_eq!(plugin.get(ids(&["a", "b"])).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn generation_follows_the_stored_revision_whatever_the_caller_sends() {
        let plugin = isolated();
        let added = add_all(&plugin, vec![DbRecord::new("x", "t")]).await;

        let without_rev = plugin
            .bulk_operations(BulkOperations::new().update(DbRecord::new("x", "t")))
            .await
            .unwrap();
        let with_stale_rev = plugin
            .bulk_operations(BulkOperations::new().update(DbRecord::new("x", "t").with_rev("7-stale")))
            .await
            .unwrap();
        let stored = plugin.get_strict(ids(&["x"])).await.unwrap();

        assert!(without_rev.is_ok());
        assert!(with_stale_rev.is_ok());
        assert_eq!(generation_of(added.successes["x"].rev.as_deref().unwrap()), 1);
        assert_eq!(generation_of(without_rev.successes["x"].rev.as_deref().unwrap()), 2);
        assert_eq!(generation_of(with_stale_rev.successes["x"].rev.as_deref().unwrap()), 3);
        assert_eq!(stored[0].generation(), 3);
    }

    #[tokio::test]
    async fn caller_revision_seeds_the_generation_of_unstored_ids() {
        let plugin = isolated();

        let response = add_all(&plugin, vec![DbRecord::new("y", "t").with_rev("4-old")]).await;

        assert_eq!(generation_of(response.successes["y"].rev.as_deref().unwrap()), 5);
    }

    #[tokio::test]
    async fn conflict_detection_rejects_mismatched_revisions() {
        let plugin = MemoryDbPlugin::builder()
            .store(MemoryStore::new())
            .conflict_detection(true)
            .build()
            .await
            .unwrap();
        let added = add_all(&plugin, vec![DbRecord::new("a", "t")]).await;
        let current = added.successes["a"].rev.clone().unwrap();

        let response = plugin
            .bulk_operations(
                BulkOperations::new()
                    .add(DbRecord::new("a", "t"))
                    .remove(DbRecord::new("a", "t").with_rev("9-other"))
                    .update(DbRecord::new("missing", "t"))
                    .update(DbRecord::new("a", "t").with_rev(current.clone())),
            )
            .await
            .unwrap();

        assert_eq!(response.errors_count, 3);
        assert_eq!(response.successes_count, 1);
        assert!(response.errors.contains_key("missing"));
        assert_eq!(
            response.errors["missing"].error,
            DocumentStoreError::RevisionConflict {
                id: "missing".to_string(),
                expected: None,
                actual: None,
            }
        );
        assert_eq!(generation_of(response.successes["a"].rev.as_deref().unwrap()), 2);
    }

    #[tokio::test]
    async fn conflict_detection_allows_removing_absent_ids() {
        let plugin = MemoryDbPlugin::builder()
            .store(MemoryStore::new())
            .conflict_detection(true)
            .build()
            .await
            .unwrap();

        let response = plugin
            .bulk_operations(BulkOperations::new().remove(DbRecord::new("ghost", "t")))
            .await
            .unwrap();

        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn plugins_over_one_store_share_state() {
        let store = MemoryStore::new();
        let first = MemoryDbPlugin::with_store(store.clone(), DbPluginOptions::named("one"));
        let second = MemoryDbPlugin::with_store(store, DbPluginOptions::named("two"));

        add_all(&first, vec![DbRecord::new("a", "t")]).await;
        assert_eq!(second.get(ids(&["a"])).await.unwrap().len(), 1);

        second.destroy().await.unwrap();
        assert!(first.all(None).await.unwrap().is_empty());
        assert_eq!(first.options().db_name.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn default_plugins_use_the_process_wide_store() {
        let first = MemoryDbPlugin::new(DbPluginOptions::default());
        let second = MemoryDbPlugin::builder().build().await.unwrap();
        let id = format!("shared-{}", Revision::next(None).token());

        assert!(first.store().same_store(second.store()));
        assert!(!first.store().same_store(&MemoryStore::new()));

        add_all(&first, vec![DbRecord::new(id.clone(), "t")]).await;
        assert_eq!(second.get(vec![id]).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_adds_of_distinct_ids_both_land() {
        let plugin = isolated();

        let tasks = ["left", "right"].map(|id| {
            let plugin = plugin.clone();
            tokio::spawn(async move {
                plugin
                    .bulk_operations(BulkOperations::new().add(DbRecord::new(id, "t")))
                    .await
            })
        });

        for task in tasks {
            let response = task.await.unwrap().unwrap();
            assert_eq!(response.successes_count, 1);
        }

        assert_eq!(plugin.get_strict(ids(&["left", "right"])).await.unwrap().len(), 2);
    }
}
