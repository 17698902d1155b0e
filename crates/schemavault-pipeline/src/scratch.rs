//! Scratch directory handling.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};

/// Creates the scratch directory (and parents) if it does not exist.
pub async fn ensure_scratch_dir(dir: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PipelineError::Scratch {
            path: dir.to_path_buf(),
            source,
        })
}

/// A local artifact path owned by one pipeline run.
///
/// Pipelines call [`ScratchFile::remove`] once they are done with the file.
/// If the guard is dropped without that (a panic, or the run's future being
/// dropped), `Drop` removes it synchronously instead. A file that was never
/// created is fine; any other removal failure is logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file without blocking the runtime and disarms the guard.
    pub async fn remove(mut self) {
        let result = tokio::fs::remove_file(&self.path).await;
        log_removal(&self.path, result);
        self.removed = true;
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.removed {
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::debug!(path = %path.display(), "removed scratch file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            "failed to remove scratch file: {}",
            e
        ),
    }
}
