//! Document routes: listing, rendered documents and raw Markdown.
//!
//! - GET /api/files - All documents plus the current generation
//! - GET /api/doc?path= - Rendered, link-rewritten HTML and the raw source
//! - GET /api/version - Current generation
//! - GET /raw/{*path} - Raw Markdown as text/plain

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use mdeasy_core::{DocPath, Generation, render_markdown};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for GET /api/files.
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    /// Document paths relative to the root.
    pub files: Vec<String>,
    /// Current generation.
    pub version: Generation,
}

/// Query for GET /api/doc.
#[derive(Debug, Deserialize)]
pub struct DocQuery {
    /// Document path relative to the root.
    #[serde(default)]
    pub path: String,
}

/// Response for GET /api/doc.
#[derive(Debug, Serialize)]
pub struct DocResponse {
    /// The path as requested.
    pub path: String,
    /// Rendered HTML with document links rewritten for the viewer.
    pub html: String,
    /// Markdown source.
    pub raw: String,
}

/// Response for GET /api/version.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Current generation.
    pub version: Generation,
}

// ============================================================================
// Handlers
// ============================================================================

/// Run filesystem and rendering work off the async workers.
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
}

/// GET /api/files - List every document under the root.
async fn list_files(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let tree = state.tree().clone();
    let files = blocking(move || Ok(tree.list())).await?;

    Ok(Json(FilesResponse {
        files,
        version: state.bus().current(),
    }))
}

/// GET /api/doc - Render one document.
///
/// # Response
///
/// - 200 OK: `{"path", "html", "raw"}`
/// - 400 Bad Request: `path` missing or blank
/// - 403 Forbidden: `path` leaves the document root
/// - 404 Not Found: no such document
async fn get_doc(
    State(state): State<AppState>,
    Query(query): Query<DocQuery>,
) -> ApiResult<Json<DocResponse>> {
    if query.path.trim().is_empty() {
        return Err(ApiError::BadRequest("path required".to_string()));
    }
    let doc = DocPath::parse(&query.path)?;

    let worker = state.clone();
    let (html, raw) = blocking(move || {
        let raw = worker.tree().read(&doc)?;
        let html = worker.rewriter().rewrite(&render_markdown(&raw), &doc);
        Ok((html, raw))
    })
    .await?;

    tracing::debug!(path = %query.path, bytes = raw.len(), "Rendered document");

    Ok(Json(DocResponse {
        path: query.path,
        html,
        raw,
    }))
}

/// GET /api/version - Current generation; viewers compare it to decide
/// whether to refetch.
async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.bus().current(),
    })
}

/// GET /raw/{*path} - Markdown source as plain text.
async fn get_raw(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let doc = DocPath::parse(&path)?;
    let tree = state.tree().clone();
    let raw = blocking(move || Ok(tree.read(&doc)?)).await?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        raw,
    ))
}

/// Build document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/files", get(list_files))
        .route("/api/doc", get(get_doc))
        .route("/api/version", get(get_version))
        .route("/raw/{*path}", get(get_raw))
}
