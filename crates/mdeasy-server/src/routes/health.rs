//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use mdeasy_core::Generation;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Current document-set generation.
    pub generation: Generation,
    /// Viewers attached to the change stream.
    pub watchers: usize,
}

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        generation: state.bus().current(),
        watchers: state.bus().waiter_count(),
    })
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
