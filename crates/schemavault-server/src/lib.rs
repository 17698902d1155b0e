//! schemavault server library logic.
//!
//! Exposes the dump and restore pipelines over HTTP alongside liveness and
//! database status probes.

pub mod api;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use schemavault_db::PoolManager;
use schemavault_pipeline::Pipelines;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used directly by `/db-status`.
    pub pool: PoolManager,
    /// Dump and restore pipelines.
    pub pipelines: Pipelines,
}

/// Maximum request body size (64 KiB). Request bodies only carry identifiers.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/db-status", get(api::db_status_handler))
        .route("/schema-dump", post(api::schema_dump_handler))
        .route("/schema-restore", post(api::schema_restore_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
