// ABOUTME: Typed error taxonomy for the sync pipeline
// ABOUTME: Distinguishes per-layer failures from run-fatal conditions

use thiserror::Error;

/// Errors raised anywhere in the sync pipeline.
///
/// The propagation boundary is positional, not kind-based: errors raised
/// before the per-layer loop (staging, connecting, listing layers) terminate
/// the run, while any error raised inside the loop is caught at the
/// orchestrator boundary, recorded in the report with the layer name, and
/// never stops the remaining layers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A layer's record collection lacks the configured identifier or
    /// timestamp field.
    #[error("layer '{layer}' is missing required field(s): {}", missing.join(", "))]
    SchemaMismatch { layer: String, missing: Vec<String> },

    /// Two distinct remote identifiers collapse to the same case-insensitive
    /// key. This indicates non-case-only divergence and cannot be resolved
    /// safely.
    #[error("identifiers '{first}' and '{second}' both normalize to '{key}'")]
    IdentifierCollision {
        key: String,
        first: String,
        second: String,
    },

    /// Cannot reach or authenticate against the hosted service.
    #[error("connection to hosted service failed: {0}")]
    ConnectionFailure(String),

    /// The hosted service rejected a mutation, or a mutation payload could
    /// not be assembled.
    #[error("apply failed during {operation}: {detail}")]
    ApplyFailure { operation: String, detail: String },

    /// Staging the offline dataset into the working copy failed.
    #[error("staging workspace error: {0}")]
    Workspace(String),

    /// Reading from the staged local store failed.
    #[error("local store read failed: {0}")]
    LocalRead(String),
}

impl SyncError {
    pub fn apply(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ApplyFailure {
            operation: operation.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_names_fields() {
        let err = SyncError::SchemaMismatch {
            layer: "hydrants".to_string(),
            missing: vec!["globalid".to_string(), "last_edited_date".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("hydrants"));
        assert!(msg.contains("globalid"));
        assert!(msg.contains("last_edited_date"));
    }

    #[test]
    fn test_collision_names_both_identifiers() {
        let err = SyncError::IdentifierCollision {
            key: "abc".to_string(),
            first: "ABC".to_string(),
            second: "abC".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ABC"));
        assert!(msg.contains("abC"));
    }
}
