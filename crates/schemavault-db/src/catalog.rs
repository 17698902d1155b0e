//! The database seam the dump/restore pipelines depend on.

use crate::pool::{DbError, PoolManager};
use crate::settings::ConnectionTarget;
use async_trait::async_trait;

/// What a pipeline needs from the database server.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Server coordinates for the changelog tool, or `None` if not configured.
    fn target(&self) -> Option<ConnectionTarget>;

    /// Creates the schema when missing. Must succeed if it already exists.
    async fn ensure_schema(&self, schema: &str) -> Result<(), DbError>;
}

#[async_trait]
impl SchemaCatalog for PoolManager {
    fn target(&self) -> Option<ConnectionTarget> {
        self.settings().target()
    }

    async fn ensure_schema(&self, schema: &str) -> Result<(), DbError> {
        self.create_schema_if_absent(schema).await
    }
}
