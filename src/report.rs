// ABOUTME: Sync report - per-layer outcomes accumulated across one run
// ABOUTME: Serializable for logging and rendered as a human-readable summary

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Counts from one successfully reconciled layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerCounts {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub duplicates_skipped: usize,
}

/// Outcome for one layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LayerOutcome {
    /// Mutations applied to the remote store.
    Synced { counts: LayerCounts },
    /// Inspection mode: copies written, nothing mutated.
    Planned { counts: LayerCounts },
    /// The layer does not exist in the offline dataset.
    Skipped,
    /// The layer failed; the rest of the run continued.
    Failed { error: String },
}

/// One entry per hosted layer, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerReport {
    pub layer: String,
    #[serde(flatten)]
    pub outcome: LayerOutcome,
}

/// Accumulated outcome of a whole sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub layers: Vec<LayerReport>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, layer: impl Into<String>, counts: LayerCounts) {
        self.layers.push(LayerReport {
            layer: layer.into(),
            outcome: LayerOutcome::Synced { counts },
        });
    }

    pub fn record_planned(&mut self, layer: impl Into<String>, counts: LayerCounts) {
        self.layers.push(LayerReport {
            layer: layer.into(),
            outcome: LayerOutcome::Planned { counts },
        });
    }

    pub fn record_skipped(&mut self, layer: impl Into<String>) {
        self.layers.push(LayerReport {
            layer: layer.into(),
            outcome: LayerOutcome::Skipped,
        });
    }

    pub fn record_failure(&mut self, layer: impl Into<String>, error: &SyncError) {
        self.layers.push(LayerReport {
            layer: layer.into(),
            outcome: LayerOutcome::Failed {
                error: error.to_string(),
            },
        });
    }

    pub fn failed_layers(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l.outcome, LayerOutcome::Failed { .. }))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_layers() == 0
    }

    /// Render the human-readable per-layer summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.layers {
            let line = match &entry.outcome {
                LayerOutcome::Synced { counts } => format!(
                    "{}: {} inserted, {} updated, {} unchanged, {} duplicate(s) skipped",
                    entry.layer,
                    counts.inserted,
                    counts.updated,
                    counts.unchanged,
                    counts.duplicates_skipped
                ),
                LayerOutcome::Planned { counts } => format!(
                    "{}: would insert {}, would update {} (inspection only)",
                    entry.layer, counts.inserted, counts.updated
                ),
                LayerOutcome::Skipped => {
                    format!("{}: skipped (not present in offline dataset)", entry.layer)
                }
                LayerOutcome::Failed { error } => format!("{}: FAILED - {}", entry.layer, error),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tracks_failures() {
        let mut report = SyncReport::new();
        report.record_success("roads", LayerCounts::default());
        report.record_failure(
            "hydrants",
            &SyncError::SchemaMismatch {
                layer: "hydrants".to_string(),
                missing: vec!["last_edited_date".to_string()],
            },
        );
        assert_eq!(report.layers.len(), 2);
        assert_eq!(report.failed_layers(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_render_lists_every_layer() {
        let mut report = SyncReport::new();
        report.record_success(
            "roads",
            LayerCounts {
                inserted: 2,
                updated: 1,
                unchanged: 5,
                duplicates_skipped: 1,
            },
        );
        report.record_planned(
            "parcels",
            LayerCounts {
                inserted: 3,
                updated: 0,
                unchanged: 0,
                duplicates_skipped: 0,
            },
        );
        report.record_skipped("valves");

        let rendered = report.render();
        assert!(rendered.contains("roads: 2 inserted, 1 updated, 5 unchanged"));
        assert!(rendered.contains("parcels: would insert 3"));
        assert!(rendered.contains("valves: skipped"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = SyncReport::new();
        report.record_success("roads", LayerCounts::default());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"layer\":\"roads\""));
        assert!(json.contains("\"outcome\":\"synced\""));
    }
}
