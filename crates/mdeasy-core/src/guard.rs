//! Shared-secret gate for the refresh hook.

/// Header carrying the refresh key directly.
pub const REFRESH_KEY_HEADER: &str = "x-refresh-key";

/// The provided credential does not match the configured key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing or invalid refresh key")]
pub struct Unauthorized;

/// A credential taken from one of the two request carriers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential(Option<String>);

impl Credential {
    /// Pick the credential from the request headers.
    ///
    /// `X-Refresh-Key` wins over `Authorization: Bearer <key>`. Blank values
    /// count as absent.
    pub fn from_headers(refresh_key: Option<&str>, bearer: Option<&str>) -> Self {
        let pick = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self(pick(refresh_key).or_else(|| pick(bearer)))
    }

    /// Credential value, if any.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Check `provided` against `expected`.
///
/// An empty `expected` disables the gate. Otherwise the comparison runs on
/// BLAKE3 digests of both values, so its timing depends on neither the
/// content nor the length of the key.
pub fn authorize(provided: Option<&str>, expected: &str) -> Result<(), Unauthorized> {
    if expected.is_empty() {
        return Ok(());
    }

    let provided = provided.unwrap_or_default();
    if constant_time_eq(
        blake3::hash(provided.as_bytes()).as_bytes(),
        blake3::hash(expected.as_bytes()).as_bytes(),
    ) && !provided.is_empty()
    {
        Ok(())
    } else {
        Err(Unauthorized)
    }
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
