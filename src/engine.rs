// ABOUTME: Sync engine - drives one reconciliation pass per hosted layer
// ABOUTME: Isolates per-layer failures and aggregates the run report

use std::path::{Path, PathBuf};

use crate::casemap::CaseMap;
use crate::dedupe::prune_duplicates;
use crate::diff::classify;
use crate::error::SyncError;
use crate::plan::{build_plan, write_inspection, LayerPlan, MutationPlan};
use crate::report::{LayerCounts, SyncReport};
use crate::snapshot::extract_snapshot;
use crate::stores::{
    FieldPredicate, GeometryEquality, Layer, LocalStore, OfflineToStagingConverter, RemoteStore,
};
use crate::workspace::StagingWorkspace;

/// How a run treats the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyMode {
    /// Execute mutation plans against the remote store.
    Apply,
    /// Write record copies under the given directory instead; no mutation
    /// call reaches the remote store.
    Inspect { out_dir: PathBuf },
}

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Field carrying the globally-unique record identifier.
    pub id_field: String,
    /// Field carrying the last-modified timestamp.
    pub ts_field: String,
    /// Restrict the run to these layer names (empty = all hosted layers).
    pub layers: Vec<String>,
    pub mode: ApplyMode,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            id_field: "globalid".to_string(),
            ts_field: "last_edited_date".to_string(),
            layers: Vec::new(),
            mode: ApplyMode::Apply,
        }
    }
}

/// Drives one full reconciliation pass: stage the offline dataset, then
/// reconcile every hosted layer sequentially.
///
/// Failures before the per-layer loop (staging, listing layers) are fatal to
/// the run. Failures inside the loop are caught, logged with the layer name,
/// recorded in the report, and never stop the remaining layers. The staging
/// workspace is released on every exit path.
pub struct SyncEngine<'a> {
    remote: &'a dyn RemoteStore,
    geometry: &'a dyn GeometryEquality,
    options: SyncOptions,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        remote: &'a dyn RemoteStore,
        geometry: &'a dyn GeometryEquality,
        options: SyncOptions,
    ) -> Self {
        Self {
            remote,
            geometry,
            options,
        }
    }

    /// Run a full pass over the offline dataset at `offline_path`.
    pub async fn run(
        &self,
        converter: &dyn OfflineToStagingConverter,
        offline_path: &Path,
    ) -> Result<SyncReport, SyncError> {
        let workspace = StagingWorkspace::create()?;
        let outcome = self.run_inner(converter, offline_path, workspace.path()).await;

        // Cleanup runs on success and failure alike; a cleanup error must not
        // mask the run's own outcome.
        if let Err(e) = workspace.close() {
            tracing::warn!("Failed to clean up staging workspace: {}", e);
        }

        outcome
    }

    async fn run_inner(
        &self,
        converter: &dyn OfflineToStagingConverter,
        offline_path: &Path,
        staging_dir: &Path,
    ) -> Result<SyncReport, SyncError> {
        tracing::info!("Staging offline dataset {:?}", offline_path);
        let local = converter.stage(offline_path, staging_dir)?;

        let layers = self.remote.list_layers().await?;
        tracing::info!("Hosted service reports {} layer(s)", layers.len());

        let mut report = SyncReport::new();
        for layer in &layers {
            if !self.options.layers.is_empty() && !self.options.layers.contains(&layer.name) {
                tracing::debug!("Layer '{}' not selected, skipping", layer.name);
                continue;
            }

            match self.sync_layer(local.as_ref(), layer).await {
                Ok(Some(counts)) => match self.options.mode {
                    ApplyMode::Apply => {
                        tracing::info!(
                            "Layer '{}': {} inserted, {} updated, {} unchanged",
                            layer.name,
                            counts.inserted,
                            counts.updated,
                            counts.unchanged
                        );
                        report.record_success(&layer.name, counts);
                    }
                    ApplyMode::Inspect { .. } => {
                        tracing::info!(
                            "Layer '{}': would insert {}, would update {}",
                            layer.name,
                            counts.inserted,
                            counts.updated
                        );
                        report.record_planned(&layer.name, counts);
                    }
                },
                Ok(None) => {
                    tracing::info!(
                        "Layer '{}' not present in offline dataset, skipping",
                        layer.name
                    );
                    report.record_skipped(&layer.name);
                }
                Err(e) => {
                    // One broken layer must never abort the run for the rest.
                    tracing::error!("Layer '{}' failed: {}", layer.name, e);
                    report.record_failure(&layer.name, &e);
                }
            }
        }

        Ok(report)
    }

    /// Reconcile a single layer. Returns None when the layer has no offline
    /// counterpart.
    async fn sync_layer(
        &self,
        local: &dyn LocalStore,
        layer: &Layer,
    ) -> Result<Option<LayerCounts>, SyncError> {
        let Some(local_coll) = local.open_record_collection(&layer.name)? else {
            return Ok(None);
        };
        let remote_coll = self.remote.fetch_records(layer).await?;

        let local_snap = extract_snapshot(&local_coll, &self.options.id_field, &self.options.ts_field)?;
        let remote_snap =
            extract_snapshot(&remote_coll, &self.options.id_field, &self.options.ts_field)?;
        let case_map = CaseMap::build(remote_snap.ids())?;

        let classified = classify(&local_snap, &remote_snap, &case_map);
        tracing::debug!(
            "Layer '{}': {} candidate insert(s), {} update(s), {} unchanged",
            layer.name,
            classified.inserts.len(),
            classified.updates.len(),
            classified.unchanged.len()
        );

        let (inserts, duplicates_skipped) = prune_duplicates(
            classified.inserts,
            &local_coll,
            &remote_coll,
            &self.options.id_field,
            self.geometry,
        );

        let counts = LayerCounts {
            inserted: inserts.len(),
            updated: classified.updates.len(),
            unchanged: classified.unchanged.len(),
            duplicates_skipped,
        };

        let inspect = matches!(self.options.mode, ApplyMode::Inspect { .. });
        let plan = build_plan(
            &inserts,
            &classified.updates,
            &case_map,
            &local_coll,
            &self.options.id_field,
            inspect,
        )?;

        match plan {
            LayerPlan::Inspection(set) => {
                // An inspection plan is only ever built in inspect mode.
                if let ApplyMode::Inspect { out_dir } = &self.options.mode {
                    let written = write_inspection(out_dir, &layer.name, &set)?;
                    for path in &written {
                        tracing::info!("Wrote inspection artifact {:?}", path);
                    }
                }
            }
            LayerPlan::Mutations(plan) => {
                self.execute_plan(layer, plan).await?;
            }
        }

        Ok(Some(counts))
    }

    /// Execute a mutation plan: delete-before-reinsert for updates, then pure
    /// inserts. The plan arrives fully built, so every delete already has its
    /// replacement payload in hand.
    async fn execute_plan(&self, layer: &Layer, plan: MutationPlan) -> Result<(), SyncError> {
        if plan.is_empty() {
            tracing::debug!("Layer '{}' already in sync", layer.name);
            return Ok(());
        }

        if !plan.delete_ids.is_empty() {
            let predicate = FieldPredicate::new(self.options.id_field.clone(), plan.delete_ids);
            self.remote.delete_records(&layer.url, &predicate).await?;
            self.remote
                .insert_records(&layer.url, &plan.update_records)
                .await?;
        }

        if !plan.insert_records.is_empty() {
            self.remote
                .insert_records(&layer.url, &plan.insert_records)
                .await?;
        }

        Ok(())
    }
}
