//! Bulk write requests and their per-item results.
//!
//! A [`BulkOperations`] batch holds three independent lists (adds, removes, updates).
//! Plugins apply each item on its own and report one [`BulkOutcome`] per item; the
//! outcomes fold into a [`BulkOperationsResponse`]. A failed item never aborts the batch
//! and never rolls back items that were already applied.

use serde::{Serialize, Serializer};
use std::{collections::HashMap, fmt};

use crate::{document::DbRecord, error::DocumentStoreError};

/// A batch of writes: adds, then removes, then updates.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperations<T = DbRecord> {
    /// Documents to insert (overwriting any document with the same id).
    pub adds: Vec<T>,
    /// Documents to delete, identified by their id.
    pub removes: Vec<T>,
    /// Documents to replace.
    pub updates: Vec<T>,
}

impl<T> Default for BulkOperations<T> {
    fn default() -> Self {
        Self {
            adds: Vec::new(),
            removes: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<T> BulkOperations<T> {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to the adds list.
    pub fn add(mut self, document: T) -> Self {
        self.adds.push(document);
        self
    }

    /// Appends a document to the removes list.
    pub fn remove(mut self, document: T) -> Self {
        self.removes.push(document);
        self
    }

    /// Appends a document to the updates list.
    pub fn update(mut self, document: T) -> Self {
        self.updates.push(document);
        self
    }

    /// Total number of items across the three lists.
    pub fn len(&self) -> usize {
        self.adds.len() + self.removes.len() + self.updates.len()
    }

    /// Returns `true` if all three lists are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which list of a batch an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkOperationKind {
    Add,
    Remove,
    Update,
}

impl fmt::Display for BulkOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkOperationKind::Add => f.write_str("add"),
            BulkOperationKind::Remove => f.write_str("remove"),
            BulkOperationKind::Update => f.write_str("update"),
        }
    }
}

/// A successfully applied item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSuccess {
    pub id: String,
    /// Always `true`.
    pub ok: bool,
    /// The revision assigned by the write, or the unchanged revision for removes.
    pub rev: Option<String>,
}

/// An item that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkError {
    pub id: String,
    /// Always `false`.
    pub ok: bool,
    pub rev: Option<String>,
    #[serde(serialize_with = "serialize_error")]
    pub error: DocumentStoreError,
}

fn serialize_error<S: Serializer>(error: &DocumentStoreError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The result of applying a single batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Success(BulkSuccess),
    Failure(BulkError),
}

impl BulkOutcome {
    pub fn success(id: impl Into<String>, rev: Option<String>) -> Self {
        BulkOutcome::Success(BulkSuccess { id: id.into(), ok: true, rev })
    }

    pub fn failure(id: impl Into<String>, rev: Option<String>, error: DocumentStoreError) -> Self {
        BulkOutcome::Failure(BulkError { id: id.into(), ok: false, rev, error })
    }

    /// Id of the item this outcome belongs to.
    pub fn id(&self) -> &str {
        match self {
            BulkOutcome::Success(success) => &success.id,
            BulkOutcome::Failure(failure) => &failure.id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BulkOutcome::Success(_))
    }
}

/// Aggregated result of a batch.
///
/// The counts tally every outcome. The maps are keyed by id, so when the same id appears
/// more than once in a batch the later outcome replaces the earlier entry while both are
/// still counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOperationsResponse {
    pub successes_count: usize,
    pub successes: HashMap<String, BulkSuccess>,
    pub errors_count: usize,
    pub errors: HashMap<String, BulkError>,
}

impl BulkOperationsResponse {
    /// Records a single outcome.
    pub fn push(&mut self, outcome: BulkOutcome) {
        match outcome {
            BulkOutcome::Success(success) => {
                self.successes_count += 1;
                self.successes.insert(success.id.clone(), success);
            }
            BulkOutcome::Failure(failure) => {
                self.errors_count += 1;
                self.errors.insert(failure.id.clone(), failure);
            }
        }
    }

    /// Folds another response into this one.
    pub fn merge(&mut self, other: BulkOperationsResponse) {
        self.successes_count += other.successes_count;
        self.successes.extend(other.successes);
        self.errors_count += other.errors_count;
        self.errors.extend(other.errors);
    }

    /// Returns `true` if no item failed.
    pub fn is_ok(&self) -> bool {
        self.errors_count == 0
    }
}

impl Extend<BulkOutcome> for BulkOperationsResponse {
    fn extend<I: IntoIterator<Item = BulkOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.push(outcome);
        }
    }
}

impl FromIterator<BulkOutcome> for BulkOperationsResponse {
    fn from_iter<I: IntoIterator<Item = BulkOutcome>>(iter: I) -> Self {
        let mut response = Self::default();
        response.extend(iter);
        response
    }
}
