use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} failed with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stdout: String,
        stderr: String,
    },
}

impl ToolError {
    /// Standard output captured before the failure. Empty if the process never started.
    pub fn stdout(&self) -> &str {
        match self {
            ToolError::Spawn { .. } => "",
            ToolError::Failed { stdout, .. } => stdout,
        }
    }

    /// Standard error captured before the failure. Empty if the process never started.
    pub fn stderr(&self) -> &str {
        match self {
            ToolError::Spawn { .. } => "",
            ToolError::Failed { stderr, .. } => stderr,
        }
    }
}
