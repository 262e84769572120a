// ABOUTME: Adapter traits for the external stores the sync engine drives
// ABOUTME: Exposes local staging, remote service, geometry equality, and staging conversion seams

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SyncError;
use crate::records::{Record, RecordCollection};

pub mod http;
pub mod sqlite;

pub use http::HttpRemoteStore;
pub use sqlite::{SqliteStagingConverter, SqliteStore};

/// One named record collection as reported by the hosted service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    pub name: String,
    pub url: String,
}

/// Structured `field ∈ values` predicate.
///
/// The engine never builds filter expressions by string concatenation; the
/// adapter owns any store-specific serialization of this predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub values: Vec<String>,
}

impl FieldPredicate {
    pub fn new(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }
}

/// The staged working copy of the offline dataset.
pub trait LocalStore: std::fmt::Debug {
    /// Open one layer's record collection, or None if the layer does not
    /// exist in the offline dataset.
    fn open_record_collection(&self, layer_name: &str)
        -> Result<Option<RecordCollection>, SyncError>;
}

/// The network-hosted authoritative store.
#[async_trait]
pub trait RemoteStore {
    /// List the layers the hosted service defines, in the order it reports
    /// them.
    async fn list_layers(&self) -> Result<Vec<Layer>, SyncError>;

    /// Fetch the full record collection for one layer.
    async fn fetch_records(&self, layer: &Layer) -> Result<RecordCollection, SyncError>;

    /// Delete the remote records matching the predicate. Only ever issued as
    /// the first half of a replace; never for offline-side deletions.
    async fn delete_records(
        &self,
        layer_url: &str,
        predicate: &FieldPredicate,
    ) -> Result<(), SyncError>;

    /// Insert the given records into the layer.
    async fn insert_records(&self, layer_url: &str, records: &[Record]) -> Result<(), SyncError>;
}

/// Content-equality test used only by the duplicate guard.
pub trait GeometryEquality {
    fn are_identical(&self, a: &Record, b: &Record) -> bool;
}

/// One-shot conversion of the offline dataset into a staged working copy.
///
/// The engine treats this as a black box that produces a LocalStore; the
/// staging directory is the scoped workspace and is removed when the run
/// ends.
pub trait OfflineToStagingConverter {
    fn stage(
        &self,
        offline_path: &Path,
        staging_dir: &Path,
    ) -> Result<Box<dyn LocalStore>, SyncError>;
}
