//! Database layer for schemavault.
//!
//! Owns the process-wide MySQL connection pool (via `r2d2`) and the few
//! statements the dump/restore pipelines need against the server: binding a
//! borrowed connection to a named schema, creating a schema if it is absent,
//! and a liveness ping.
//!
//! # Design decisions
//!
//! - **Lazily built pool**: the pool is created on first use from
//!   [`DbSettings`] and never dials the server during construction, so a
//!   service with an unreachable database still starts and reports the
//!   failure through `/db-status`.
//! - **Explicit lifecycle**: [`PoolManager`] moves from idle to ready to
//!   closed exactly once. A closed manager refuses to rebuild the pool.
//! - **Blocking driver on worker threads**: the `mysql` driver is synchronous;
//!   every async entry point runs its borrow and round-trips inside
//!   `tokio::task::spawn_blocking`.

mod catalog;
mod pool;
mod settings;

pub use catalog::SchemaCatalog;
pub use pool::{quote_identifier, DbConnection, DbError, DbPool, PingReport, PoolManager};
pub use settings::{ConnectionTarget, DbSettings};
