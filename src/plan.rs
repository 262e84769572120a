// ABOUTME: Apply planner - sequences the per-layer mutations or inspection copies
// ABOUTME: Guarantees a delete is never planned without its replacement insert

use std::path::{Path, PathBuf};

use crate::casemap::CaseMap;
use crate::error::SyncError;
use crate::records::{Record, RecordCollection};

/// The per-layer mutation sequence: delete the stale remote versions of the
/// updated records, then insert their newer local versions, then insert the
/// brand-new records.
///
/// A plan is only ever constructed whole. `delete_ids` and `update_records`
/// are built in lockstep, so a delete without its replacement insert is
/// unrepresentable; if any payload lookup fails, no plan exists and nothing
/// executes.
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    /// Canonical remote identifiers of the records being replaced.
    pub delete_ids: Vec<String>,
    /// Newer local records replacing the deleted remote versions.
    pub update_records: Vec<Record>,
    /// Records new to the remote store.
    pub insert_records: Vec<Record>,
}

impl MutationPlan {
    pub fn is_empty(&self) -> bool {
        self.delete_ids.is_empty() && self.insert_records.is_empty()
    }
}

/// Record copies produced instead of mutations when inspecting.
#[derive(Debug, Clone, Default)]
pub struct InspectionSet {
    pub inserts: Vec<Record>,
    pub updates: Vec<Record>,
}

/// A layer's plan: either mutations to execute against the remote store, or
/// copies to write aside for auditing.
#[derive(Debug, Clone)]
pub enum LayerPlan {
    Mutations(MutationPlan),
    Inspection(InspectionSet),
}

/// Build the plan for one layer.
///
/// `inserts` and `updates` are local identifiers as classified by the diff
/// engine (with inserts already pruned by the duplicate guard). Update
/// identifiers are translated to the remote's canonical case through the
/// case map before they appear in a delete operation.
pub fn build_plan(
    inserts: &[String],
    updates: &[String],
    case_map: &CaseMap,
    local: &RecordCollection,
    id_field: &str,
    inspect: bool,
) -> Result<LayerPlan, SyncError> {
    let insert_records = collect_records(inserts, local, id_field)?;

    let mut delete_ids = Vec::with_capacity(updates.len());
    let mut update_records = Vec::with_capacity(updates.len());
    for id in updates {
        let canonical = case_map.canonical(id).ok_or_else(|| {
            SyncError::apply(
                "plan",
                format!("update '{id}' has no canonical remote identifier"),
            )
        })?;
        let record = local_record(local, id_field, id)?;
        delete_ids.push(canonical.to_string());
        update_records.push(record.clone());
    }

    if inspect {
        return Ok(LayerPlan::Inspection(InspectionSet {
            inserts: insert_records,
            updates: update_records,
        }));
    }

    Ok(LayerPlan::Mutations(MutationPlan {
        delete_ids,
        update_records,
        insert_records,
    }))
}

/// Write an inspection set aside as JSON artifacts, one file per record set.
///
/// Empty sets are skipped so an audit directory only contains layers with
/// pending work.
pub fn write_inspection(
    out_dir: &Path,
    layer_name: &str,
    set: &InspectionSet,
) -> Result<Vec<PathBuf>, SyncError> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| SyncError::Workspace(format!("cannot create {out_dir:?}: {e}")))?;

    let mut written = Vec::new();
    for (suffix, records) in [("inserts", &set.inserts), ("updates", &set.updates)] {
        if records.is_empty() {
            continue;
        }
        let path = out_dir.join(format!("{layer_name}.{suffix}.json"));
        let contents = serde_json::to_string_pretty(records)
            .map_err(|e| SyncError::Workspace(format!("cannot serialize inspection set: {e}")))?;
        std::fs::write(&path, contents)
            .map_err(|e| SyncError::Workspace(format!("cannot write {path:?}: {e}")))?;
        written.push(path);
    }
    Ok(written)
}

fn collect_records(
    ids: &[String],
    local: &RecordCollection,
    id_field: &str,
) -> Result<Vec<Record>, SyncError> {
    ids.iter()
        .map(|id| local_record(local, id_field, id).cloned())
        .collect()
}

fn local_record<'a>(
    local: &'a RecordCollection,
    id_field: &str,
    id: &str,
) -> Result<&'a Record, SyncError> {
    local.record_by_id(id_field, id).ok_or_else(|| {
        SyncError::apply(
            "plan",
            format!("record '{id}' vanished from layer '{}'", local.layer),
        )
    })
}
