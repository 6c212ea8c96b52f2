//! Health check route handlers.

use axum::{extract::State, http::StatusCode};

use taco_cloud_core::{PageRequest, TacoSort};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reads one taco to prove the store is reachable (ingredient reads are
/// cached and would hide an outage). Returns 503 Service Unavailable if the
/// read fails.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state
        .tacos()
        .find_all(PageRequest::first(1), TacoSort::NewestFirst)
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
