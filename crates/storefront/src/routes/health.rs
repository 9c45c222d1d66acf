//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::services::catalog::LoadStatus;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable until the catalog has loaded, and again
/// after a failed load.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    match state.catalog().status().await {
        LoadStatus::Ready => StatusCode::OK,
        LoadStatus::Loading | LoadStatus::Failed(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
