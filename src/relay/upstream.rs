//! Outbound client for chat completions endpoints.
//!
//! # Responsibilities
//! - Own the pooled HTTP client shared by all request tasks
//! - Enforce connect and total request timeouts
//! - POST a completion request and hand back the raw response body
//!
//! # Design Decisions
//! - Single attempt per call; no retries or backoff
//! - Non-2xx responses are errors; their bodies are logged, never returned
//! - Dropping the returned future aborts the in-flight request

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header::AUTHORIZATION, StatusCode};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::relay::credential::Credential;
use crate::relay::payload::Message;

/// Wire shape POSTed to the completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamRequest {
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl UpstreamRequest {
    /// Non-streaming request carrying `messages` as-is.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            stream: false,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Errors from the outbound call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect or total request deadline exceeded.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(StatusCode),

    /// Connection, request building or body transfer failed.
    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl UpstreamError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(timeout);
        }
        // reqwest errors carry the request URL but never header values.
        Self::Transport(err.without_url().to_string())
    }

    /// Label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
            Self::Transport(_) => "transport",
        }
    }
}

/// Pooled client for completions endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl UpstreamClient {
    /// Build the shared client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            request_timeout,
        })
    }

    /// POST `request` to `url` with `credential` as bearer token and return
    /// the response body untouched.
    pub async fn complete(
        &self,
        url: &Url,
        credential: &Credential,
        request: &UpstreamRequest,
    ) -> Result<Bytes, UpstreamError> {
        let start = Instant::now();
        let result = self.send(url, credential, request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_upstream(outcome, start);

        result
    }

    async fn send(
        &self,
        url: &Url,
        credential: &Credential,
        request: &UpstreamRequest,
    ) -> Result<Bytes, UpstreamError> {
        tracing::debug!(
            url = %url,
            messages = request.messages.len(),
            credential = %credential,
            "Forwarding conversation upstream"
        );

        let authorization = credential
            .authorization()
            .map_err(|_| UpstreamError::Transport("credential is not a valid header value".into()))?;

        let response = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, authorization)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.request_timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.request_timeout))?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %String::from_utf8_lossy(&body),
                "Upstream rejected request"
            );
            return Err(UpstreamError::Status(status));
        }

        tracing::info!(
            status = %status,
            body = %String::from_utf8_lossy(&body),
            "Upstream response"
        );
        Ok(body)
    }
}
