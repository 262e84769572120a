// ABOUTME: Duplicate guard - drops candidate inserts already present remotely
// ABOUTME: Provides tolerance-based geometry equality for identifier churn detection

use serde_json::Value;

use crate::records::{Record, RecordCollection};
use crate::stores::GeometryEquality;

/// Remove candidate inserts whose content already exists on the remote store.
///
/// The offline store reassigns identifiers on every export, so a record
/// synced in a prior pass can reappear under a new identifier. Identifier
/// comparison cannot catch this; geometry/content comparison can, at the cost
/// of being heuristic. Returns the surviving candidates and the number
/// pruned.
pub fn prune_duplicates(
    candidates: Vec<String>,
    local: &RecordCollection,
    remote: &RecordCollection,
    id_field: &str,
    equality: &dyn GeometryEquality,
) -> (Vec<String>, usize) {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut pruned = 0usize;

    for id in candidates {
        let Some(candidate) = local.record_by_id(id_field, &id) else {
            // Snapshot and collection disagree; keep the candidate and let
            // plan building surface the inconsistency.
            kept.push(id);
            continue;
        };
        let duplicate = remote
            .records
            .iter()
            .any(|existing| equality.are_identical(candidate, existing));
        if duplicate {
            tracing::info!(
                "Skipping insert of '{}' in layer '{}': identical record already on remote",
                id,
                local.layer
            );
            pruned += 1;
        } else {
            kept.push(id);
        }
    }

    (kept, pruned)
}

/// Geometry equality with an absolute numeric tolerance.
///
/// Two records are identical when both carry a geometry and the geometries
/// are structurally equal, with numbers compared within `tolerance` to absorb
/// floating-point drift across export round trips. Records without geometry
/// never match: treating attribute-only records as duplicates risks dropping
/// genuinely new data, and a spurious insert is the safer failure mode.
#[derive(Debug, Clone)]
pub struct ToleranceGeometry {
    tolerance: f64,
}

impl ToleranceGeometry {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn values_match(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => (x - y).abs() <= self.tolerance,
                _ => x == y,
            },
            (Value::Array(xs), Value::Array(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| self.values_match(x, y))
            }
            (Value::Object(xs), Value::Object(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|(k, x)| {
                        ys.get(k).map(|y| self.values_match(x, y)).unwrap_or(false)
                    })
            }
            _ => a == b,
        }
    }
}

impl Default for ToleranceGeometry {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

impl GeometryEquality for ToleranceGeometry {
    fn are_identical(&self, a: &Record, b: &Record) -> bool {
        match (&a.geometry, &b.geometry) {
            (Some(ga), Some(gb)) => self.values_match(ga, gb),
            _ => false,
        }
    }
}
