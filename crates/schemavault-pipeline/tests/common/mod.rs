#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use schemavault_db::{ConnectionTarget, DbError, SchemaCatalog};
use schemavault_pipeline::Pipelines;
use schemavault_store::{MemoryObjectStore, ObjectStoreGateway};
use schemavault_tool::{ChangelogTool, RunOptions, ToolError, ToolOutput};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const CHANGELOG: &[u8] =
    b"databaseChangeLog:\n- changeSet:\n    id: 1700000000000-1\n    author: backup\n";

pub fn target() -> ConnectionTarget {
    ConnectionTarget {
        host: "db.internal".to_string(),
        port: 3306,
        user: "backup".to_string(),
        password: Some("s3cret".to_string()),
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub target: Option<ConnectionTarget>,
    pub schemas: Mutex<HashSet<String>>,
    pub ensure_calls: Mutex<Vec<String>>,
    pub fail_ensure: bool,
}

impl FakeCatalog {
    pub fn configured() -> Self {
        Self {
            target: Some(target()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SchemaCatalog for FakeCatalog {
    fn target(&self) -> Option<ConnectionTarget> {
        self.target.clone()
    }

    async fn ensure_schema(&self, schema: &str) -> Result<(), DbError> {
        self.ensure_calls.lock().unwrap().push(schema.to_string());
        if self.fail_ensure {
            return Err(DbError::Task("connection refused".to_string()));
        }
        self.schemas.lock().unwrap().insert(schema.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ToolCall {
    pub args: Vec<String>,
    pub options: RunOptions,
    /// Whether the changelog named in the arguments existed when the tool ran.
    pub changelog_present: bool,
}

/// Stands in for Liquibase: `generate-changelog` writes [`CHANGELOG`], `update`
/// reads the changelog from its working directory.
#[derive(Default)]
pub struct FakeTool {
    pub calls: Mutex<Vec<ToolCall>>,
    pub applied: Mutex<Vec<Vec<u8>>>,
    pub failure: Option<(String, String)>,
    pub skip_write: bool,
}

impl FakeTool {
    pub fn failing(stdout: &str, stderr: &str) -> Self {
        Self {
            failure: Some((stdout.to_string(), stderr.to_string())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn changelog_path(args: &[String], options: &RunOptions) -> Option<PathBuf> {
    let file = args
        .iter()
        .find_map(|a| a.strip_prefix("--changelog-file="))?;
    let path = Path::new(file);
    Some(match &options.cwd {
        Some(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    })
}

#[async_trait]
impl ChangelogTool for FakeTool {
    async fn run(&self, args: &[String], options: &RunOptions) -> Result<ToolOutput, ToolError> {
        let path = changelog_path(args, options).expect("changelog argument");
        let changelog_present = path.exists();
        self.calls.lock().unwrap().push(ToolCall {
            args: args.to_vec(),
            options: options.clone(),
            changelog_present,
        });

        if let Some((stdout, stderr)) = &self.failure {
            return Err(ToolError::Failed {
                program: "liquibase".to_string(),
                status: "exit code 1".to_string(),
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            });
        }

        match args.first().map(String::as_str) {
            Some("generate-changelog") if !self.skip_write => {
                std::fs::write(&path, CHANGELOG).unwrap();
            }
            Some("update") => {
                self.applied.lock().unwrap().push(std::fs::read(&path).unwrap());
            }
            _ => {}
        }

        Ok(ToolOutput {
            stdout: "Liquibase command completed successfully.".to_string(),
            stderr: String::new(),
        })
    }
}

pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub tool: Arc<FakeTool>,
    pub store: Arc<MemoryObjectStore>,
    pub scratch: tempfile::TempDir,
    pub pipelines: Pipelines,
}

pub fn harness_with(catalog: FakeCatalog, tool: FakeTool, prefix: &str) -> Harness {
    let catalog = Arc::new(catalog);
    let tool = Arc::new(tool);
    let store = Arc::new(MemoryObjectStore::new());
    let scratch = tempfile::tempdir().unwrap();
    let gateway = Arc::new(ObjectStoreGateway::new(store.clone(), prefix));
    let pipelines = Pipelines::new(
        catalog.clone(),
        tool.clone(),
        gateway,
        scratch.path().join("work"),
    )
    .with_clock(Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));

    Harness {
        catalog,
        tool,
        store,
        scratch,
        pipelines,
    }
}

pub fn harness() -> Harness {
    harness_with(FakeCatalog::configured(), FakeTool::default(), "")
}

/// Files left behind in the scratch directory.
pub fn leftover_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
