// ABOUTME: Library root for field-sync
// ABOUTME: Reconciles offline field-collected datasets with a hosted record service

pub mod casemap;
pub mod commands;
pub mod dedupe;
pub mod diff;
pub mod engine;
pub mod error;
pub mod plan;
pub mod records;
pub mod report;
pub mod snapshot;
pub mod stores;
pub mod workspace;

pub use casemap::CaseMap;
pub use diff::{classify, Classification};
pub use engine::{ApplyMode, SyncEngine, SyncOptions};
pub use error::SyncError;
pub use records::{Record, RecordCollection};
pub use report::{LayerCounts, SyncReport};
pub use snapshot::{extract_snapshot, Snapshot};
