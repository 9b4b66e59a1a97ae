//! Refresh hook for writers.
//!
//! Endpoint: POST /refresh
//!
//! A writer (for example an agent that just edited documents) calls this to
//! bump the generation. Every viewer on the change stream is woken and
//! refetches, keeping its place unless its document was removed.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use mdeasy_core::Generation;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::RefreshAuthorized;
use crate::state::AppState;

/// Optional request body for POST /refresh.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Free-text note on what changed.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response for POST /refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub ok: bool,
    /// Generation after this refresh.
    pub version: Generation,
    /// The caller's reason, empty when none was given.
    pub reason: String,
}

/// POST /refresh - Announce that the document set changed.
///
/// The body is optional; when present it must be JSON.
///
/// # Response
///
/// - 200 OK: `{"ok": true, "version": g, "reason": "..."}`
/// - 400 Bad Request: body is not valid JSON
/// - 401 Unauthorized: refresh key missing or wrong (nothing changes)
async fn refresh(
    State(state): State<AppState>,
    _auth: RefreshAuthorized,
    body: Bytes,
) -> ApiResult<Json<RefreshResponse>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<Option<RefreshRequest>>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid refresh body: {}", e)))?
            .unwrap_or_default()
    };
    let reason = request.reason.unwrap_or_default();

    let version = state.bus().publish();

    tracing::info!(
        generation = version,
        reason = %reason,
        watchers = state.bus().waiter_count(),
        "Document set refreshed"
    );

    Ok(Json(RefreshResponse {
        ok: true,
        version,
        reason,
    }))
}

/// Build refresh routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/refresh", post(refresh))
}
