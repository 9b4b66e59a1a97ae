//! Refresh-key extraction from `X-Refresh-Key` or an `Authorization: Bearer` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use mdeasy_core::{Credential, REFRESH_KEY_HEADER, authorize};

use crate::error::ApiError;
use crate::state::AppState;

/// Proof that the request carried the configured refresh key.
///
/// Priority:
/// 1. `X-Refresh-Key: <key>`
/// 2. `Authorization: Bearer <key>`
///
/// When no key is configured every request passes. Otherwise a missing or
/// wrong key rejects the request with `Unauthorized` before the handler runs.
#[derive(Debug)]
pub struct RefreshAuthorized;

impl FromRequestParts<AppState> for RefreshAuthorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = credential_from_parts(parts);

        authorize(credential.as_deref(), &state.config().refresh_key).map_err(|e| {
            tracing::warn!(
                credential_present = credential.as_deref().is_some(),
                "Rejected refresh request"
            );
            ApiError::from(e)
        })?;

        Ok(RefreshAuthorized)
    }
}

/// Collect the refresh key from whichever carrier the client used.
fn credential_from_parts(parts: &Parts) -> Credential {
    let refresh_key = parts
        .headers
        .get(REFRESH_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let bearer = parts.headers.typed_get::<Authorization<Bearer>>();

    Credential::from_headers(refresh_key, bearer.as_ref().map(|auth| auth.token()))
}
