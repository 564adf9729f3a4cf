//! REST API for forecasts and schedule optimization.
//!
//! Endpoints:
//! - `GET /health` — liveness probe
//! - `GET /forecast` — hourly grid forecast for a region
//! - `POST /optimize` — single-workload schedule optimization
//! - `POST /fleet` — independent per-workload fleet optimization

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::AppConfig;
use crate::grid::profile::RegionTable;

/// Immutable application state shared across all request handlers.
///
/// Constructed once at startup and wrapped in `Arc`; every optimization
/// call is pure over this read-only state, so no locks are needed.
pub struct AppState {
    /// Built-in region profile table.
    pub table: RegionTable,
    /// Validated defaults for weights and workload fields.
    pub config: AppConfig,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/forecast", get(handlers::get_forecast))
        .route("/optimize", post(handlers::post_optimize))
        .route("/fleet", post(handlers::post_fleet))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
