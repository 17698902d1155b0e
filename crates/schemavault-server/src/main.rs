//! schemavault server binary.
//!
//! Starts an axum HTTP server with structured logging, wires the database
//! pool, object store and changelog tool into the pipelines, and shuts down
//! gracefully on SIGTERM/SIGINT, closing the pool once on the way out.

use schemavault_db::PoolManager;
use schemavault_pipeline::Pipelines;
use schemavault_server::{app, config, AppState};
use schemavault_store::{ObjectStoreGateway, S3ObjectStore};
use schemavault_tool::ProcessRunner;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("SCHEMAVAULT_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration; the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Database pool (built lazily on first use)
    let db_settings = config.database.settings();
    if db_settings.target().is_none() {
        tracing::warn!("DB_HOST/DB_USER not set; database endpoints will report not configured");
    }
    let pool = PoolManager::new(db_settings);

    // Object store
    let store_settings = config.store.settings();
    let gateway = match S3ObjectStore::connect(&store_settings).await {
        Some(client) => ObjectStoreGateway::new(Arc::new(client), store_settings.prefix.clone()),
        None => {
            tracing::warn!(
                "AWS_REGION/S3_BUCKET_NAME not set; dump and restore will report not configured"
            );
            ObjectStoreGateway::unconfigured()
        }
    };

    let runner = ProcessRunner::new(&config.tool.binary);
    let scratch_dir = config.tool.scratch_dir();
    tracing::info!(
        tool = %runner.program().display(),
        scratch_dir = %scratch_dir.display(),
        "changelog tool configured"
    );

    let pipelines = Pipelines::new(
        Arc::new(pool.clone()),
        Arc::new(runner),
        Arc::new(gateway),
        scratch_dir,
    );

    // Build application
    let app = app(AppState {
        pool: pool.clone(),
        pipelines,
    });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting schemavault server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address; is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    pool.shutdown();
    tracing::info!("schemavault server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
