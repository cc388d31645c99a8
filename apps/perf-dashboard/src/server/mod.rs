//! Dashboard HTTP server.
//!
//! # Endpoints
//!
//! - `GET /` - HTML page with charts and a summary table, auto-refreshing at
//!   the poll cadence
//! - `GET /api/v1/snapshot` - Latest snapshot as JSON (503 until the first
//!   successful refresh)
//! - `GET /health` - JSON health status
//! - `GET /healthz` - Liveness check (simple OK)
//! - `GET /readyz` - Readiness check (a snapshot has been published)
//! - `GET /metrics` - Prometheus metrics in text format

mod page;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use perf_analytics::charts::ChartOptions;

use crate::context::DashboardContext;
use crate::monitoring::get_metrics_handle;
use crate::poller::{DashboardState, RefreshFailure};

pub use page::render_page;

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Dashboard version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Record source being polled.
    pub source: String,
    /// Periods in the latest snapshot.
    pub records: usize,
    /// Time of the last successful refresh.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Successful refreshes.
    pub refresh_count: u64,
    /// Failed refreshes.
    pub failure_count: u64,
    /// Most recent failure, if the last attempt failed.
    pub last_error: Option<RefreshFailure>,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Latest refresh succeeded.
    Healthy,
    /// Serving a stale snapshot after a failed refresh.
    Degraded,
    /// No snapshot published yet.
    Unhealthy,
}

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Stable error reason, `NOT_READY` before the first refresh attempt.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

// =============================================================================
// Server State
// =============================================================================

/// Shared state for the HTTP handlers.
pub struct ServerState {
    version: String,
    started_at: Instant,
    source: String,
    refresh_interval: Duration,
    chart_options: ChartOptions,
    state_rx: watch::Receiver<DashboardState>,
}

impl ServerState {
    /// Create handler state reading from the poller's channel.
    #[must_use]
    pub fn new(
        version: String,
        context: &DashboardContext,
        state_rx: watch::Receiver<DashboardState>,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            source: context.source_description(),
            refresh_interval: context.refresh_interval(),
            chart_options: context.chart_options(),
            state_rx,
        }
    }

    fn current(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }
}

/// Build the router. Exposed for in-process tests.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// Dashboard HTTP server.
pub struct DashboardServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    cancel: CancellationToken,
}

impl DashboardServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, state: Arc<ServerState>, cancel: CancellationToken) -> Self {
        Self {
            addr,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `DashboardServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), DashboardServerError> {
        let app = router(self.state);

        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| DashboardServerError::BindFailed(self.addr, e.to_string()))?;

        tracing::info!(addr = %self.addr, "Dashboard listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| DashboardServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Dashboard server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn index_handler(State(state): State<Arc<ServerState>>) -> Html<String> {
    let current = state.current();
    Html(render_page(
        &current,
        &state.chart_options,
        state.refresh_interval,
        &state.source,
    ))
}

async fn snapshot_handler(State(state): State<Arc<ServerState>>) -> Response {
    let current = state.current();
    match current.snapshot {
        Some(snapshot) => (StatusCode::OK, Json(snapshot.as_ref().clone())).into_response(),
        None => {
            let body = current.last_error.map_or_else(
                || ApiError {
                    code: "NOT_READY".to_string(),
                    message: "no snapshot has been computed yet".to_string(),
                },
                |failure| ApiError {
                    code: failure.code.reason().to_string(),
                    message: failure.message,
                },
            );
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state, &state.current());
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.current().is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn build_health_response(state: &ServerState, current: &DashboardState) -> HealthResponse {
    HealthResponse {
        status: determine_health_status(current),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        source: state.source.clone(),
        records: current.snapshot.as_ref().map_or(0, |s| s.len()),
        last_refresh: current.last_refresh,
        refresh_count: current.refresh_count,
        failure_count: current.failure_count,
        last_error: current.last_error.clone(),
    }
}

const fn determine_health_status(current: &DashboardState) -> HealthStatus {
    match (current.snapshot.is_some(), current.last_error.is_some()) {
        (false, _) => HealthStatus::Unhealthy,
        (true, true) => HealthStatus::Degraded,
        (true, false) => HealthStatus::Healthy,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Dashboard server errors.
#[derive(Debug, thiserror::Error)]
pub enum DashboardServerError {
    /// Failed to bind the listener.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
