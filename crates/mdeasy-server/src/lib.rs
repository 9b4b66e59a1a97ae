//! mdeasy-server: HTTP server for MD-Easy
//!
//! This crate provides:
//! - Rendered Markdown documents with viewer-relative links
//! - A refresh hook writers call after changing documents
//! - Server-Sent Events (SSE) so viewers refetch without polling
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mdeasy_server::{AppState, ServerConfig, app};
//! use mdeasy_core::{DocumentTree, VersionCounter};
//!
//! let config = ServerConfig::from_env()?;
//! let tree = DocumentTree::open(&config.doc_root)?;
//! let state = AppState::new(config, tree, Arc::new(VersionCounter::new()));
//! let router = app(state)?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{
    RequestSpan, propagate_request_id_layer, set_request_id_layer,
};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::ViewerEvent;
pub use state::AppState;

// Re-export dependent crates
pub use mdeasy_core;

/// Build the router with the full middleware stack.
pub fn app(state: AppState) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&state.config().cors_allowed_origins)?;

    Ok(routes::build_router(state)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(cors)
        .layer(set_request_id_layer()))
}

/// Build CORS layer from configuration.
fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    if allowed_origins.trim() == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    // Parse comma-separated origins
    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin: {}", s),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
