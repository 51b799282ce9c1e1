//! Request-scoped failures of the relay and demo chat paths.

use thiserror::Error;

use crate::relay::payload::DecodeError;
use crate::relay::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("content type must be application/json")]
    UnsupportedMediaType,

    #[error("missing {} header", crate::relay::X_GITHUB_TOKEN)]
    MissingCredential,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("demo chat unavailable: {0}")]
    DemoChatUnavailable(&'static str),

    #[error("demo chat reply had no message content")]
    DemoChatMalformed,
}

impl RelayError {
    /// Stable identifier used in error bodies and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "invalid_payload",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::MissingCredential => "missing_credential",
            Self::Upstream(UpstreamError::Timeout(_)) => "upstream_timeout",
            Self::Upstream(_) => "upstream_error",
            Self::DemoChatUnavailable(_) => "demo_chat_unavailable",
            Self::DemoChatMalformed => "demo_chat_malformed",
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
