//! Connection pool lifecycle and schema-level helpers.

use crate::settings::{ConnectionTarget, DbSettings};
use mysql::prelude::Queryable;
use mysql::OptsBuilder;
use r2d2::{Pool, PooledConnection};
use r2d2_mysql::MySqlConnectionManager;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;

/// A type alias for the MySQL connection pool.
pub type DbPool = Pool<MySqlConnectionManager>;

/// A connection borrowed from [`DbPool`]. Dropping it hands it back to the pool.
pub type DbConnection = PooledConnection<MySqlConnectionManager>;

/// Message reported when host or user is missing.
const NOT_CONFIGURED: &str = "Database not configured";

/// Errors that can occur while borrowing connections or running statements.
#[derive(Debug, Error)]
pub enum DbError {
    /// Host or user is missing from the settings.
    #[error("Database not configured: set DB_HOST and DB_USER (and DB_PASSWORD)")]
    NotConfigured,

    /// The pool was shut down and will not be rebuilt.
    #[error("database pool has been shut down")]
    Closed,

    /// An empty schema name was supplied.
    #[error("Schema/database name is required")]
    MissingSchema,

    /// No connection could be borrowed within the acquire timeout.
    #[error("failed to borrow database connection: {0}")]
    Pool(#[from] r2d2::Error),

    /// The server rejected a statement or the connection failed mid-flight.
    #[error("database query failed: {0}")]
    Query(#[from] mysql::Error),

    /// The blocking worker running the operation failed.
    #[error("database task failed: {0}")]
    Task(String),
}

/// Outcome of a liveness probe. Never an error: failures land in `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReport {
    pub ok: bool,
    /// Elapsed milliseconds, absent when no connection was attempted.
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

enum PoolState {
    Idle,
    Ready(DbPool),
    Closed,
}

struct PoolInner {
    settings: DbSettings,
    state: Mutex<PoolState>,
}

/// Owns the process-wide connection pool.
///
/// Cheap to clone; every clone shares the same pool and lifecycle state.
#[derive(Clone)]
pub struct PoolManager {
    inner: Arc<PoolInner>,
}

impl PoolManager {
    /// Creates a manager. No connection is opened until the pool is first used.
    pub fn new(settings: DbSettings) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                settings,
                state: Mutex::new(PoolState::Idle),
            }),
        }
    }

    /// Returns the settings the manager was built with.
    pub fn settings(&self) -> &DbSettings {
        &self.inner.settings
    }

    /// Returns the shared pool, building it on first call.
    ///
    /// `Ok(None)` means host or user is not configured, which callers treat
    /// differently from a transient failure.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Closed` once [`PoolManager::shutdown`] has run.
    pub fn acquire_pool(&self) -> Result<Option<DbPool>, DbError> {
        let Some(target) = self.inner.settings.target() else {
            return Ok(None);
        };

        let mut state = self
            .inner
            .state
            .lock()
            .map_err(|_| DbError::Task("pool state lock poisoned".to_string()))?;

        match &*state {
            PoolState::Ready(pool) => Ok(Some(pool.clone())),
            PoolState::Closed => Err(DbError::Closed),
            PoolState::Idle => {
                let pool = build_pool(&target, &self.inner.settings);
                tracing::info!(
                    host = %target.host,
                    port = target.port,
                    max_size = pool.max_size(),
                    "created database connection pool"
                );
                *state = PoolState::Ready(pool.clone());
                Ok(Some(pool))
            }
        }
    }

    /// Borrows a connection and switches its session to `schema`.
    ///
    /// Blocking; call from a worker thread.
    ///
    /// # Errors
    ///
    /// Fails when the pool is unavailable, no connection can be borrowed, or
    /// the schema switch is rejected. In the last case the connection has
    /// already gone back to the pool.
    pub fn bind_to_schema(&self, schema: &str) -> Result<DbConnection, DbError> {
        if schema.is_empty() {
            return Err(DbError::MissingSchema);
        }
        let mut conn = self.borrow()?;
        if let Err(err) = conn.query_drop(format!("USE {}", quote_identifier(schema))) {
            drop(conn);
            return Err(err.into());
        }
        Ok(conn)
    }

    /// Runs `sql` against `schema` and returns the first column of the first row.
    ///
    /// Blocking; call from a worker thread.
    ///
    /// # Errors
    ///
    /// Propagates borrow, schema switch, and query failures.
    pub fn query_for_schema(&self, schema: &str, sql: &str) -> Result<Option<i64>, DbError> {
        let mut conn = self.bind_to_schema(schema)?;
        let value = conn.query_first::<i64, _>(sql)?;
        Ok(value)
    }

    /// Probes the server with `SELECT 1`, optionally bound to `schema`.
    ///
    /// Never fails: every error is folded into the report.
    pub async fn ping(&self, schema: Option<String>) -> PingReport {
        match self.acquire_pool() {
            Ok(Some(_)) => {}
            Ok(None) => {
                return PingReport {
                    ok: false,
                    latency_ms: None,
                    error: Some(NOT_CONFIGURED.to_string()),
                }
            }
            Err(e) => {
                return PingReport {
                    ok: false,
                    latency_ms: None,
                    error: Some(e.to_string()),
                }
            }
        }

        let manager = self.clone();
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || match schema.as_deref() {
            Some(schema) => manager.query_for_schema(schema, "SELECT 1 AS n"),
            None => {
                let mut conn = manager.borrow()?;
                Ok(conn.query_first::<i64, _>("SELECT 1 AS n")?)
            }
        })
        .await
        .map_err(|e| DbError::Task(e.to_string()))
        .and_then(|r| r);
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(value) => PingReport {
                ok: value == Some(1),
                latency_ms: Some(latency_ms),
                error: None,
            },
            Err(e) => PingReport {
                ok: false,
                latency_ms: Some(latency_ms),
                error: Some(e.to_string()),
            },
        }
    }

    /// Creates `schema` if it does not exist yet. Succeeds if it already does.
    ///
    /// # Errors
    ///
    /// Propagates borrow and statement failures.
    pub async fn create_schema_if_absent(&self, schema: &str) -> Result<(), DbError> {
        if schema.is_empty() {
            return Err(DbError::MissingSchema);
        }
        let manager = self.clone();
        let statement = format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            quote_identifier(schema)
        );
        tokio::task::spawn_blocking(move || {
            let mut conn = manager.borrow()?;
            conn.query_drop(statement)?;
            Ok(())
        })
        .await
        .map_err(|e| DbError::Task(e.to_string()))?
    }

    /// Closes the pool. Later calls, and calls before any pool existed, are no-ops.
    pub fn shutdown(&self) {
        let previous = match self.inner.state.lock() {
            Ok(mut state) => std::mem::replace(&mut *state, PoolState::Closed),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), PoolState::Closed),
        };
        if let PoolState::Ready(pool) = previous {
            let state = pool.state();
            drop(pool);
            tracing::info!(
                connections = state.connections,
                idle = state.idle_connections,
                "closed database connection pool"
            );
        }
    }

    /// Borrows a connection on the pool's default session.
    fn borrow(&self) -> Result<DbConnection, DbError> {
        let pool = self.acquire_pool()?.ok_or(DbError::NotConfigured)?;
        Ok(pool.get()?)
    }
}

/// Wraps `name` in backticks, doubling any backtick it contains.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn build_pool(target: &ConnectionTarget, settings: &DbSettings) -> DbPool {
    let opts = OptsBuilder::new()
        .ip_or_hostname(Some(target.host.clone()))
        .tcp_port(target.port)
        .user(Some(target.user.clone()))
        .pass(target.password.clone())
        .tcp_connect_timeout(Some(settings.acquire_timeout));

    let manager = MySqlConnectionManager::new(opts);

    // No idle minimum: the pool dials the server only when a borrow needs it.
    Pool::builder()
        .max_size(settings.connection_limit.max(1))
        .min_idle(Some(0))
        .connection_timeout(settings.acquire_timeout)
        .build_unchecked(manager)
}
