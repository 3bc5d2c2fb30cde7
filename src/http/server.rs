//! HTTP API server for the live view.
//!
//! Read-only REST endpoints serving rolling-store snapshots and collector
//! status to a dashboard. The chart rendering itself lives elsewhere; this
//! server only hands out data.

use crate::collector::Collector;
use crate::core::PointSample;
use crate::parsing::display_label;
use crate::store::RollingStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

/// One legend entry: the full label plus its short display form.
#[derive(Debug, Serialize)]
pub struct LabelEntry {
    pub label: String,
    pub display: String,
}

/// Response for listing known labels
#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub labels: Vec<LabelEntry>,
    pub total: usize,
}

/// Response for a single rolling series
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub label: String,
    pub samples: Vec<PointSample>,
}

/// Response for the full snapshot
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub series: HashMap<String, Vec<PointSample>>,
    pub total_series: usize,
    pub total_samples: usize,
}

/// Response for collector status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub freshness: String,
    pub state: String,
    pub last_success: Option<DateTime<Utc>>,
    pub poll_interval_secs: u64,
    pub sensors: usize,
    pub samples: usize,
    pub polls_completed: u64,
    pub polls_failed: u64,
    pub points_ingested: u64,
    pub points_skipped: u64,
    pub sink_batches: u64,
    pub sink_errors: u64,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Shared application state
pub struct AppState {
    pub store: Arc<RollingStore>,
    pub collector: Arc<Collector>,
}

/// Custom error type for API errors
pub enum ApiError {
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Create the HTTP server with all routes
pub fn create_server(store: Arc<RollingStore>, collector: Arc<Collector>) -> Router {
    let state = Arc::new(AppState { store, collector });

    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/labels", get(list_labels))
        .route("/api/points", get(snapshot))
        .route("/api/points/:label", get(read_series))
        .route("/api/status", get(status))
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(SuccessResponse { message: "Argus HTTP API is running".to_string() })
}

/// GET /api/labels - List all known labels in natural sort order
async fn list_labels(State(state): State<Arc<AppState>>) -> Json<LabelsResponse> {
    let labels: Vec<LabelEntry> = state
        .store
        .labels()
        .into_iter()
        .map(|label| {
            let display = display_label(&label).to_string();
            LabelEntry { label, display }
        })
        .collect();
    let total = labels.len();

    Json(LabelsResponse { labels, total })
}

/// GET /api/points - Snapshot of every rolling series
async fn snapshot(State(state): State<Arc<AppState>>) -> Json<SnapshotResponse> {
    let series = state.store.read_all();
    let total_series = series.len();
    let total_samples = series.values().map(Vec::len).sum();

    Json(SnapshotResponse { series, total_series, total_samples })
}

/// GET /api/points/:label - Snapshot of one rolling series
async fn read_series(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let samples = state
        .store
        .read(&label)
        .ok_or_else(|| ApiError::NotFound(format!("Label '{}' not found", label)))?;

    Ok(Json(SeriesResponse { label, samples }))
}

/// GET /api/status - Collector freshness and metrics
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let metrics = state.collector.metrics();

    Json(StatusResponse {
        freshness: state.collector.freshness().as_str().to_string(),
        state: state.collector.state().as_str().to_string(),
        last_success: state.collector.last_success(),
        poll_interval_secs: state.collector.poll_interval().as_secs(),
        sensors: state.store.series_count(),
        samples: state.store.sample_count(),
        polls_completed: metrics.polls_completed,
        polls_failed: metrics.polls_failed,
        points_ingested: metrics.points_ingested,
        points_skipped: metrics.points_skipped,
        sink_batches: metrics.sink_batches,
        sink_errors: metrics.sink_errors,
    })
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    store: Arc<RollingStore>,
    collector: Arc<Collector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(store, collector);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Argus HTTP API server listening on http://{}", addr);
    println!();
    println!("Available endpoints:");
    println!("  GET /api/labels        - List all known labels");
    println!("  GET /api/points        - Snapshot of every rolling series");
    println!("  GET /api/points/:label - Snapshot of one rolling series");
    println!("  GET /api/status        - Collector freshness and metrics");
    println!("  GET /health            - Health check");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
