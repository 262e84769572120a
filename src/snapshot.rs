// ABOUTME: Snapshot extraction - maps record identifiers to last-modified timestamps
// ABOUTME: Validates that the configured fields exist on the collection schema

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::SyncError;
use crate::records::{parse_timestamp, RecordCollection};

/// Point-in-time identifier→timestamp mapping for one layer on one store.
///
/// Built once per layer per sync pass and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<String, DateTime<Utc>>,
}

impl Snapshot {
    pub fn get(&self, id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, DateTime<Utc>)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(id, ts)| (id.to_string(), *ts))
                .collect(),
        }
    }
}

/// Extract a Snapshot from a record collection.
///
/// Both `id_field` and `ts_field` must exist on the collection schema;
/// otherwise the layer is rejected with a SchemaMismatch naming the missing
/// field(s). Records without an identifier or with an unparseable timestamp
/// are skipped with a warning rather than failing the layer.
pub fn extract_snapshot(
    collection: &RecordCollection,
    id_field: &str,
    ts_field: &str,
) -> Result<Snapshot, SyncError> {
    let missing: Vec<String> = [id_field, ts_field]
        .iter()
        .filter(|f| !collection.has_field(f))
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SyncError::SchemaMismatch {
            layer: collection.layer.clone(),
            missing,
        });
    }

    let mut entries = HashMap::with_capacity(collection.records.len());
    for record in &collection.records {
        let Some(id) = record.identifier(id_field) else {
            tracing::warn!(
                "Skipping record without identifier in layer '{}'",
                collection.layer
            );
            continue;
        };
        let Some(ts) = record.attribute(ts_field).and_then(parse_timestamp) else {
            tracing::warn!(
                "Skipping record '{}' in layer '{}': missing or unparseable timestamp",
                id,
                collection.layer
            );
            continue;
        };
        entries.insert(id.to_string(), ts);
    }

    Ok(Snapshot { entries })
}
