//! HTTP transport for the Moodle REST server
//!
//! [`Transport`] is the seam between [`MoodleClient`](super::MoodleClient) and
//! the network: it sends already-flattened parameters and hands back parsed
//! JSON. Failures are classified into [`MoodleError`] variants here so nothing
//! above this layer sees a `reqwest` type.

use crate::domain::MoodleError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Wire parameters: already flattened, already stringified
pub type WireParams = [(String, String)];

/// Sends web-service requests and parses their JSON responses
///
/// Implementations must return [`MoodleError::Timeout`] or
/// [`MoodleError::ConnectionFailed`] for transport-level failures so callers
/// can distinguish them from remote application errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `params` in the query string
    async fn get(
        &self,
        url: &str,
        params: &WireParams,
        timeout: Duration,
    ) -> Result<Value, MoodleError>;

    /// Sends `params` as a form-encoded body
    async fn post(
        &self,
        url: &str,
        params: &WireParams,
        timeout: Duration,
    ) -> Result<Value, MoodleError>;
}

/// [`Transport`] backed by a single reused `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared HTTP client
    ///
    /// # Errors
    ///
    /// Returns [`MoodleError::ConnectionFailed`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, MoodleError> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("moodlecli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MoodleError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(request: RequestBuilder, timeout: Duration) -> Result<Value, MoodleError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(MoodleError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        // Functions without a return value answer with an empty body or `null`
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            MoodleError::InvalidResponse(format!("Response is not JSON ({e}): {}", truncate(&body)))
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &WireParams,
        timeout: Duration,
    ) -> Result<Value, MoodleError> {
        Self::send(self.client.get(url).query(params), timeout).await
    }

    async fn post(
        &self,
        url: &str,
        params: &WireParams,
        timeout: Duration,
    ) -> Result<Value, MoodleError> {
        Self::send(self.client.post(url).form(params), timeout).await
    }
}

fn classify(err: reqwest::Error) -> MoodleError {
    if err.is_timeout() {
        MoodleError::Timeout(err.to_string())
    } else {
        MoodleError::ConnectionFailed(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
