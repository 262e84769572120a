// ABOUTME: Scoped staging workspace - owns the temporary working copy for one run
// ABOUTME: Released explicitly on every exit path, with Drop as the backstop

use std::path::Path;
use tempfile::TempDir;

use crate::error::SyncError;

/// Exclusive temporary workspace holding the staged copy of the offline
/// dataset for one run.
///
/// Ownership is explicit rather than ambient: the orchestrator creates it,
/// passes its path to the converter, and closes it when the run ends,
/// regardless of how any layer fared. TempDir's Drop removes the directory
/// even on panic.
#[derive(Debug)]
pub struct StagingWorkspace {
    dir: TempDir,
}

impl StagingWorkspace {
    pub fn create() -> Result<Self, SyncError> {
        let dir = tempfile::Builder::new()
            .prefix("field-sync-")
            .tempdir()
            .map_err(|e| SyncError::Workspace(format!("cannot create staging dir: {e}")))?;
        tracing::debug!("Created staging workspace at {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace, reporting any cleanup failure.
    pub fn close(self) -> Result<(), SyncError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| SyncError::Workspace(format!("cannot remove {path:?}: {e}")))?;
        tracing::debug!("Removed staging workspace {:?}", path);
        Ok(())
    }
}
