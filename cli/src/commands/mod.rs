//! Subcommands and the helpers they share.

pub mod files;
pub mod read;
pub mod refresh;
pub mod version;
pub mod watch;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Header carrying the refresh key.
const REFRESH_KEY_HEADER: &str = "x-refresh-key";

/// Output that can also be printed for people.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    code: String,
    message: String,
}

/// Build the HTTP client, attaching the refresh key to every request.
pub fn build_client(key: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
        let mut value =
            HeaderValue::from_str(key).context("refresh key is not a valid header value")?;
        value.set_sensitive(true);
        headers.insert(REFRESH_KEY_HEADER, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

/// Send a request and decode a JSON response, surfacing server errors.
pub async fn make_request<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = check(request.send().await.context("request failed")?).await?;
    response
        .json::<T>()
        .await
        .context("failed to decode server response")
}

/// Turn a non-success response into an error carrying the server's message.
pub async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => Err(anyhow!(
            "{} ({}): {}",
            status,
            err.error.code,
            err.error.message
        )),
        Err(_) if body.trim().is_empty() => Err(anyhow!("{}", status)),
        Err(_) => Err(anyhow!("{}: {}", status, body.trim())),
    }
}

/// Print as JSON, or formatted when `human` is set.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Format a server timestamp in local time.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
