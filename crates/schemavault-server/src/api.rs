//! API handlers for the schemavault server.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemavault_pipeline::{PipelineError, PipelineOutcome};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Request body for `POST /schema-dump`.
#[derive(Debug, Default, Deserialize)]
pub struct DumpRequest {
    /// Schema to capture.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Request body for `POST /schema-restore`.
#[derive(Debug, Default, Deserialize)]
pub struct RestoreRequest {
    /// Schema to create (if needed) and migrate.
    #[serde(default)]
    pub schema: Option<String>,
    /// Object key returned by an earlier dump.
    #[serde(default, rename = "s3Key")]
    pub s3_key: Option<String>,
}

/// Response body for a successful dump or restore.
#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub ok: bool,
    pub schema: String,
    /// Object key of the changelog.
    #[serde(rename = "s3Key")]
    pub s3_key: String,
}

impl From<PipelineOutcome> for PipelineResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            ok: true,
            schema: outcome.schema,
            s3_key: outcome.remote_key,
        }
    }
}

/// Response body for a failed dump or restore.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    /// Tool standard output, present when the changelog tool failed.
    #[serde(
        default,
        rename = "liquibaseStdout",
        skip_serializing_if = "Option::is_none"
    )]
    pub liquibase_stdout: Option<String>,
    /// Tool standard error, present when the changelog tool failed.
    #[serde(
        default,
        rename = "liquibaseStderr",
        skip_serializing_if = "Option::is_none"
    )]
    pub liquibase_stderr: Option<String>,
}

/// Query parameters for `GET /db-status`.
#[derive(Debug, Deserialize)]
pub struct DbStatusQuery {
    pub schema: Option<String>,
}

/// Response body for `GET /db-status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DbStatusResponse {
    /// The probed schema, `null` for the pool default.
    pub schema: Option<String>,
    pub ok: bool,
    #[serde(default, rename = "latencyMs", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// API error type mapping failures to HTTP status codes.
///
/// Pipeline validation failures are `400` and other pipeline failures `500`.
/// Tool failures carry the tool's captured output in the body. A request body
/// that cannot be read keeps the rejection's status (e.g. `413` over the size
/// limit). Every variant renders as [`ErrorResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Pipeline(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
        };
        let (stdout, stderr) = match &self {
            ApiError::Pipeline(e) => match e.tool_output() {
                Some((stdout, stderr)) => (Some(stdout.to_string()), Some(stderr.to_string())),
                None => (None, None),
            },
            ApiError::Body(_) => (None, None),
        };

        let body = ErrorResponse {
            ok: false,
            error: self.to_string(),
            liquibase_stdout: stdout,
            liquibase_stderr: stderr,
        };

        (status, Json(body)).into_response()
    }
}

/// Handler for `GET /health`.
pub async fn health() -> &'static str {
    "OK"
}

/// Handler for `GET /`.
pub async fn root() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "schemavault server is running"
    }))
}

/// Handler for `GET /db-status`.
///
/// Always `200`; connection problems are reported in the body.
pub async fn db_status_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<DbStatusQuery>, QueryRejection>,
) -> Json<DbStatusResponse> {
    let schema = query
        .ok()
        .and_then(|Query(q)| q.schema)
        .filter(|s| !s.is_empty());

    let report = state.pool.ping(schema.clone()).await;

    Json(DbStatusResponse {
        schema,
        ok: report.ok,
        latency_ms: report.latency_ms,
        error: report.error,
    })
}

/// Handler for `POST /schema-dump`.
pub async fn schema_dump_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let request: DumpRequest = parse_body(&body?);
    let schema = request.schema.unwrap_or_default();
    let pipelines = state.pipelines.clone();

    let outcome = run_detached(async move { pipelines.dump(&schema).await }).await?;

    Ok(Json(outcome.into()))
}

/// Handler for `POST /schema-restore`.
pub async fn schema_restore_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let request: RestoreRequest = parse_body(&body?);
    let schema = request.schema.unwrap_or_default();
    let s3_key = request.s3_key.unwrap_or_default();
    let pipelines = state.pipelines.clone();

    let outcome = run_detached(async move { pipelines.restore(&schema, &s3_key).await }).await?;

    Ok(Json(outcome.into()))
}

/// Runs a pipeline on its own task so a dropped client connection does not
/// cancel it halfway through.
async fn run_detached<F>(pipeline: F) -> Result<PipelineOutcome, PipelineError>
where
    F: Future<Output = Result<PipelineOutcome, PipelineError>> + Send + 'static,
{
    tokio::spawn(pipeline)
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}

/// Parses a JSON body, treating an empty or malformed body as `{}` so that
/// field validation produces the error response.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("ignoring unparseable request body: {}", e);
        T::default()
    })
}
