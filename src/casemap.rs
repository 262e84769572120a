// ABOUTME: Case-insensitive identifier lookup between the two stores
// ABOUTME: Maps lowercase identifiers to the remote store's canonical casing

use std::collections::HashMap;

use crate::error::SyncError;

/// Lowercase identifier → canonical-case identifier as recorded by the
/// remote store.
///
/// The staging export lowercases identifiers, so a locally-derived identifier
/// must be translated back to the remote's canonical form before any
/// operation targets the remote store. Built once per layer and discarded
/// with it.
#[derive(Debug, Clone, Default)]
pub struct CaseMap {
    entries: HashMap<String, String>,
}

impl CaseMap {
    /// Build a CaseMap from the remote snapshot's identifiers.
    ///
    /// Two distinct canonical identifiers collapsing to one lowercase key
    /// indicate non-case-only divergence; that layer is rejected rather than
    /// guessed at.
    pub fn build<'a>(remote_ids: impl Iterator<Item = &'a str>) -> Result<Self, SyncError> {
        let mut entries: HashMap<String, String> = HashMap::new();
        for id in remote_ids {
            let key = id.to_lowercase();
            if let Some(existing) = entries.get(&key) {
                if existing != id {
                    return Err(SyncError::IdentifierCollision {
                        key,
                        first: existing.clone(),
                        second: id.to_string(),
                    });
                }
            } else {
                entries.insert(key, id.to_string());
            }
        }
        Ok(Self { entries })
    }

    /// The canonical remote identifier for a locally-derived one, if the
    /// record exists remotely.
    pub fn canonical(&self, local_id: &str) -> Option<&str> {
        self.entries.get(&local_id.to_lowercase()).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
