//! HTTP client for the chat-completions endpoint.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::llm::types::ChatRequest;
use crate::resilience::Failure;

const COMPLETIONS_PATH: &str = "openai/v1/chat/completions";

/// Errors from a single upstream attempt.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The API answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16, body: String },

    /// Connection, timeout or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL cannot address the completions endpoint.
    #[error("invalid upstream URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl Failure for LlmError {
    fn status(&self) -> Option<u16> {
        match self {
            LlmError::Status { status, .. } => Some(*status),
            LlmError::Transport(e) => e.status().map(|s| s.as_u16()),
            LlmError::Endpoint(_) => None,
        }
    }
}

/// Long-lived handle to the upstream API.
///
/// Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl LlmClient {
    /// Build a client from configuration.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, LlmError> {
        let mut base = upstream.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(COMPLETIONS_PATH)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: upstream.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Make one attempt and return the raw success body.
    pub async fn post_chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        tracing::debug!(model = %request.model, endpoint = %self.endpoint, "Calling upstream");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The status decides retries, so a failed body read must not hide it.
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Upstream returned error status");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}
