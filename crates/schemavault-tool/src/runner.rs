use crate::error::ToolError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Per-call process settings layered over the service's own environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory for the child. Inherits the service's when `None`.
    pub cwd: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Everything a successful run printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the changelog tool once with the given arguments.
#[async_trait]
pub trait ChangelogTool: Send + Sync {
    async fn run(&self, args: &[String], options: &RunOptions) -> Result<ToolOutput, ToolError>;
}

/// Spawns the tool as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl ChangelogTool for ProcessRunner {
    async fn run(&self, args: &[String], options: &RunOptions) -> Result<ToolOutput, ToolError> {
        let program = self.program.display().to_string();

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(program = %program, ?args, cwd = ?options.cwd, "spawning changelog tool");

        let child = command.spawn().map_err(|e| ToolError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

        // Both pipes are drained concurrently so a chatty child cannot block on a full buffer.
        let output = child.wait_with_output().await.map_err(|e| ToolError::Spawn {
            program: program.clone(),
            message: format!("failed to collect output: {}", e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "termination by signal".to_string(),
            };
            tracing::warn!(program = %program, %status, "changelog tool failed");
            return Err(ToolError::Failed {
                program,
                status,
                stdout,
                stderr,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
