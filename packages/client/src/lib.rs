#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the disaster map backend.
//!
//! The refresh pipeline only depends on the [`DisasterSource`] trait, so
//! tests and alternative transports can stand in for [`DisasterClient`].
//! No retry or timeout is applied here: a failed fetch is reported to the
//! user, who retries manually.

pub mod submit;

use async_trait::async_trait;
use serde_json::Value;

pub use disaster_map_client_models as models;

/// Path of the record listing endpoint.
pub const DISASTERS_PATH: &str = "/api/disasters";

/// Maximum length of the response body preview included in errors.
const BODY_PREVIEW_LEN: usize = 200;

/// Errors from backend requests.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Request URL.
        url: String,
    },

    /// The backend answered 2xx with a body of the wrong shape.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with the body.
        message: String,
    },

    /// The backend refused a report or subscription.
    #[error("Request rejected: {message}")]
    Rejected {
        /// Message from the backend, or a generic one.
        message: String,
    },

    /// The request failed a client-side check and was not sent.
    #[error("Invalid request: {0}")]
    Invalid(#[from] models::ValidationError),
}

impl ClientError {
    /// Whether this error came from the transport rather than the payload.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// Source of raw disaster records.
#[async_trait]
pub trait DisasterSource: Send + Sync {
    /// Fetches the full record list as raw JSON entries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-2xx status, or a
    /// body that is not a JSON array.
    async fn fetch_disasters(&self) -> Result<Vec<Value>, ClientError>;
}

/// `reqwest`-backed client for the disaster map backend.
#[derive(Debug, Clone)]
pub struct DisasterClient {
    client: reqwest::Client,
    base_url: String,
}

impl DisasterClient {
    /// Creates a client for the backend at `base_url`
    /// (e.g. `http://127.0.0.1:5000`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Backend base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl DisasterSource for DisasterClient {
    async fn fetch_disasters(&self) -> Result<Vec<Value>, ClientError> {
        let url = self.url(DISASTERS_PATH);
        log::debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("Fetching disasters failed: HTTP {status}");
            return Err(ClientError::Status { status, url });
        }

        let text = response.text().await?;
        let records = parse_disaster_list(&text)?;
        log::debug!("Fetched {} record(s) from {url}", records.len());
        Ok(records)
    }
}

/// Parses a `/api/disasters` body, which must be a JSON array.
///
/// # Errors
///
/// Returns [`ClientError::MalformedResponse`] if the body is not JSON or
/// not an array.
pub fn parse_disaster_list(body: &str) -> Result<Vec<Value>, ClientError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse {
        message: format!("invalid JSON ({e}): {}", preview(body)),
    })?;

    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(ClientError::MalformedResponse {
            message: format!("expected an array, got {}", json_kind(&other)),
        }),
    }
}

pub(crate) fn preview(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_body() {
        let entries = parse_disaster_list(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(parse_disaster_list("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_bodies() {
        for body in [r#"{"error": "Error retrieving disaster data"}"#, "null", "\"x\"", "3"] {
            let err = parse_disaster_list(body).unwrap_err();
            assert!(
                matches!(err, ClientError::MalformedResponse { .. }),
                "{body}: {err}"
            );
            assert!(!err.is_transport());
        }
    }

    #[test]
    fn rejects_invalid_json_with_preview() {
        let body = format!("<html>{}</html>", "x".repeat(500));
        let err = parse_disaster_list(&body).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("<html>"));
        assert!(message.len() < 400);
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = DisasterClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url(DISASTERS_PATH),
            "http://localhost:5000/api/disasters"
        );
    }
}
