use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use schemavault_db::{ConnectionTarget, SchemaCatalog};
use schemavault_store::ObjectStoreGateway;
use schemavault_tool::{ChangelogTool, LiquibaseCommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Source of the instant stamped into artifact names.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Reads the wall clock.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Result of a successful dump or restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub schema: String,
    /// Full object key of the changelog: the one written by a dump, or the
    /// one supplied to a restore.
    pub remote_key: String,
}

/// The dump and restore pipelines with their collaborators.
///
/// Cheap to clone; each clone shares the same pool, tool, and store.
#[derive(Clone)]
pub struct Pipelines {
    pub(crate) catalog: Arc<dyn SchemaCatalog>,
    pub(crate) tool: Arc<dyn ChangelogTool>,
    pub(crate) store: Arc<ObjectStoreGateway>,
    pub(crate) scratch_dir: PathBuf,
    pub(crate) clock: Clock,
}

impl Pipelines {
    pub fn new(
        catalog: Arc<dyn SchemaCatalog>,
        tool: Arc<dyn ChangelogTool>,
        store: Arc<ObjectStoreGateway>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            tool,
            store,
            scratch_dir: scratch_dir.into(),
            clock: system_clock(),
        }
    }

    /// Replaces the clock used for artifact names.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Resolves the database coordinates, failing when host or user is unset.
    pub(crate) fn connection_target(&self) -> Result<ConnectionTarget, PipelineError> {
        self.catalog.target().ok_or_else(|| {
            PipelineError::Config(
                "Database not configured: set DB_HOST and DB_USER (and DB_PASSWORD)".to_string(),
            )
        })
    }

    pub(crate) fn liquibase(&self, target: &ConnectionTarget, schema: &str) -> LiquibaseCommand {
        LiquibaseCommand::new(
            target.jdbc_url(schema),
            target.user.clone(),
            target.password.clone(),
        )
    }
}
