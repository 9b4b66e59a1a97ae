//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mdeasy_core::{PathError, TreeError, Unauthorized};
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Document tree error.
    #[error("document error: {0}")]
    Tree(#[from] TreeError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Tree(e) => match e {
                TreeError::NotFound(_) => "NOT_FOUND",
                TreeError::OutsideRoot(_) => "FORBIDDEN",
                TreeError::Io(_) => "IO_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Tree(e) => match e {
                TreeError::NotFound(_) => StatusCode::NOT_FOUND,
                TreeError::OutsideRoot(_) => StatusCode::FORBIDDEN,
                TreeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::Empty => Self::BadRequest("path required".to_string()),
            PathError::Traversal(_) => Self::Forbidden(e.to_string()),
        }
    }
}

impl From<Unauthorized> for ApiError {
    fn from(e: Unauthorized) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mdeasy_core::DocPath;

    #[test]
    fn test_path_error_mapping() {
        let empty: ApiError = PathError::Empty.into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let traversal: ApiError = PathError::Traversal("../x".to_string()).into();
        assert_eq!(traversal.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(traversal.code(), "FORBIDDEN");
    }

    #[test]
    fn test_tree_error_mapping() {
        let doc = DocPath::parse("a.md").unwrap();
        let missing = ApiError::from(TreeError::NotFound(doc.clone()));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.code(), "NOT_FOUND");

        let outside = ApiError::from(TreeError::OutsideRoot(doc));
        assert_eq!(outside.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unauthorized_mapping() {
        let err: ApiError = Unauthorized.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
