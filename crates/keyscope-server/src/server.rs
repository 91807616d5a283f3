use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use keyscope_core::{AnalysisResult, Error};
use keyscope_local::Analyzer;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};

pub const GENERIC_FAILURE: &str = "Failed to analyze URL.";
const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidUrl(_) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(s) => (StatusCode::BAD_REQUEST, s),
            ApiError::Internal(detail) => {
                // Upstream details stay in the log, not the response.
                tracing::error!(error = %detail, "analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_FAILURE.to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self { analyzer }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    url: Option<String>,
}

fn require_url(url: Option<String>) -> Result<String, ApiError> {
    match url {
        Some(u) if !u.trim().is_empty() => Ok(u),
        _ => Err(ApiError::BadRequest("No URL provided".to_string())),
    }
}

async fn run_analysis(state: &AppState, url: &str) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state.analyzer.analyze(url).await?;
    Ok(Json(AnalysisResult::clone(&result)))
}

async fn analyze_get(
    State(state): State<AppState>,
    params: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = require_url(params.url)?;
    run_analysis(&state, &url).await
}

async fn analyze_post(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeParams>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(params) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = require_url(params.url)?;
    run_analysis(&state, &url).await
}

async fn index() -> &'static str {
    "Hello from keyscope! Visit /analyze?url=..."
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Directory of static UI assets served at `/`.
    pub static_dir: Option<PathBuf>,
    /// Request body cap for `POST /analyze` (bytes). `None` uses 64 KiB.
    pub body_limit_bytes: Option<usize>,
}

pub fn router(state: AppState, opts: &RouterOptions) -> Router {
    let api = Router::new()
        .route("/analyze", get(analyze_get).post(analyze_post))
        .route("/healthz", get(healthz));
    let app = match opts.static_dir.as_ref() {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api.route("/", get(index)),
    };
    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(
            opts.body_limit_bytes.unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
        ))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "keyscope listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("keyscope stopped");
    Ok(())
}
