//! Error types for the dump and restore pipelines.

use schemavault_db::DbError;
use schemavault_store::StoreError;
use schemavault_tool::ToolError;
use std::path::PathBuf;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request input is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Required configuration is absent.
    #[error("{0}")]
    Config(String),

    /// A database operation failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The changelog tool could not start or exited nonzero.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The object store is unconfigured or a transfer failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The scratch directory could not be created.
    #[error("failed to prepare scratch directory {}: {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The downloaded changelog is not readable where the tool will look for it.
    #[error("downloaded changelog is not accessible at {}: {source}", .path.display())]
    ArtifactMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task running the pipeline panicked or was cancelled.
    #[error("pipeline task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// True for errors caused by the request rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }

    /// Captured `(stdout, stderr)` when the changelog tool caused the failure.
    pub fn tool_output(&self) -> Option<(&str, &str)> {
        match self {
            PipelineError::Tool(err) => Some((err.stdout(), err.stderr())),
            _ => None,
        }
    }
}
