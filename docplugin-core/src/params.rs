//! Query parameters and plugin construction options.

use serde::{Deserialize, Serialize};

/// Filter accepted by [`DbPlugin::all`](crate::plugin::DbPlugin::all).
///
/// Only exact document type matching is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// When set, only documents with exactly this type label are returned.
    #[serde(rename = "DocumentType", default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl QueryParams {
    /// Creates parameters matching a single document type.
    pub fn document_type(document_type: impl Into<String>) -> Self {
        Self { document_type: Some(document_type.into()) }
    }

    /// Returns `true` if a record with the given type label passes this filter.
    pub fn matches(&self, document_type: &str) -> bool {
        self.document_type
            .as_deref()
            .is_none_or(|expected| expected == document_type)
    }
}

/// Options handed to a plugin at construction.
///
/// Plugins keep these around and expose them, but the in-memory plugin does not
/// interpret them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbPluginOptions {
    /// Logical database name.
    #[serde(rename = "dbName", default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
}

impl DbPluginOptions {
    /// Creates options for the named database.
    pub fn named(db_name: impl Into<String>) -> Self {
        Self { db_name: Some(db_name.into()) }
    }
}
