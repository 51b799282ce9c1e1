//! Response construction.
//!
//! # Responsibilities
//! - Relay upstream bodies verbatim as `application/json`
//! - Map relay errors to HTTP status codes and a JSON error descriptor
//!
//! # Design Decisions
//! - Client mistakes are 4xx, upstream trouble is 5xx
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Upstream error bodies are never echoed back

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::relay::{RelayError, UpstreamError};

/// Wrap a raw upstream body as the endpoint's response.
pub fn passthrough(body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::DemoChatUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DemoChatMalformed => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut error = json!({
            "type": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Upstream(UpstreamError::Status(upstream)) = &self {
            error["upstream_status"] = json!(upstream.as_u16());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::decode;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let decode_err = RelayError::from(decode(b"{").unwrap_err());
        assert_eq!(decode_err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            RelayError::UnsupportedMediaType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            RelayError::Upstream(UpstreamError::Timeout(Duration::from_secs(30))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            RelayError::Upstream(UpstreamError::Transport("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::DemoChatUnavailable("off").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_upstream_status_descriptor() {
        let response =
            RelayError::Upstream(UpstreamError::Status(StatusCode::UNAUTHORIZED)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "upstream_error");
        assert_eq!(body["error"]["upstream_status"], 401);
    }

    #[tokio::test]
    async fn test_missing_credential_descriptor() {
        let body = body_json(RelayError::MissingCredential.into_response()).await;
        assert_eq!(body["error"]["type"], "missing_credential");
        assert_eq!(body["error"]["message"], "missing X-GitHub-Token header");
    }

    #[tokio::test]
    async fn test_passthrough_is_verbatim() {
        let raw = Bytes::from_static(br#"{"choices":[{"message":{"content":"Arr"}}],"x":  1}"#);
        let response = passthrough(raw.clone());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes, raw);
    }
}
