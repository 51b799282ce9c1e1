//! Endpoint handlers.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::http::request::{is_json_content, request_id};
use crate::http::response::passthrough;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::{decode, Credential, RelayError, RelayResult};

pub const WELCOME: &str = "Welcome to My CoPilot Extension!";

pub async fn welcome() -> &'static str {
    WELCOME
}

/// `POST /`: decode, augment and forward a conversation.
pub async fn relay_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let response = match relay(&state, &headers, &body).await {
        Ok(upstream_body) => passthrough(upstream_body),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(request_id = %request_id, error = %e, "Relay failed");
            } else {
                tracing::warn!(request_id = %request_id, error = %e, "Relay request rejected");
            }
            e.into_response()
        }
    };

    metrics::record_request("relay", response.status().as_u16(), start);
    response
}

async fn relay(state: &AppState, headers: &HeaderMap, body: &[u8]) -> RelayResult<Bytes> {
    if !is_json_content(headers) {
        return Err(RelayError::UnsupportedMediaType);
    }

    tracing::info!(payload = %String::from_utf8_lossy(body), "Inbound payload");
    let conversation = decode(body)?;
    tracing::info!(conversation = ?conversation, "Decoded conversation");

    let credential = Credential::from_headers(headers);
    state.relay.relay(credential, conversation).await
}

#[derive(Debug, Deserialize)]
pub struct TestChatParams {
    #[serde(default = "default_test_message")]
    pub message: String,
}

fn default_test_message() -> String {
    "Say Hello".to_string()
}

/// `GET /test/chat`: one-shot persona chat for manual checks.
pub async fn test_chat(
    State(state): State<AppState>,
    Query(params): Query<TestChatParams>,
) -> Response {
    let start = Instant::now();

    let result = match &state.demo_chat {
        Some(chat) => chat.reply(&params.message).await,
        None => Err(RelayError::DemoChatUnavailable("disabled by configuration")),
    };

    let response = match result {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Test chat failed");
            e.into_response()
        }
    };

    metrics::record_request("test_chat", response.status().as_u16(), start);
    response
}
