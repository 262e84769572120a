// ABOUTME: Diff engine - classifies local records as insert, update, or unchanged
// ABOUTME: Pure function over two snapshots and the case map, no I/O

use crate::casemap::CaseMap;
use crate::snapshot::Snapshot;

/// The three disjoint outcomes of classification. Every identifier in the
/// local snapshot lands in exactly one of the three sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Local identifiers with no remote counterpart (candidate inserts).
    pub inserts: Vec<String>,
    /// Local identifiers whose record is strictly newer than the remote's.
    pub updates: Vec<String>,
    /// Everything else, including timestamp ties.
    pub unchanged: Vec<String>,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.unchanged.len()
    }
}

/// Classify every identifier in the local snapshot against the remote.
///
/// An identifier whose lowercase form is absent from the case map is a
/// candidate insert. Otherwise it is an update iff the local timestamp is
/// strictly greater than the remote's; ties resolve to unchanged so equal
/// snapshots produce no churn. Identifiers are visited in sorted order so the
/// output is deterministic.
pub fn classify(local: &Snapshot, remote: &Snapshot, case_map: &CaseMap) -> Classification {
    let mut result = Classification::default();

    let mut ids: Vec<&str> = local.ids().collect();
    ids.sort_unstable();

    for id in ids {
        let local_ts = local.get(id).expect("id came from the local snapshot");
        match case_map.canonical(id) {
            None => result.inserts.push(id.to_string()),
            Some(canonical) => match remote.get(canonical) {
                Some(remote_ts) if local_ts > remote_ts => result.updates.push(id.to_string()),
                _ => result.unchanged.push(id.to_string()),
            },
        }
    }

    result
}
