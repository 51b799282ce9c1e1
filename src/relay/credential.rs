//! Caller-supplied bearer credential.

use std::fmt;

use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue};

/// Header the chat-extension platform uses to hand over the caller's token.
/// The name is part of the platform contract and must not change.
pub const X_GITHUB_TOKEN: &str = "X-GitHub-Token";

/// Bearer token forwarded upstream for exactly one request.
///
/// Held as raw header bytes: the token's shape is not checked, so opaque
/// (non-UTF-8) tokens are forwarded as received. `Debug` and `Display` never
/// print the token itself.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(Vec<u8>);

impl Credential {
    pub fn new(token: impl Into<Vec<u8>>) -> Self {
        Self(token.into())
    }

    /// Read the credential from the request headers.
    ///
    /// Returns `None` when the header is absent or blank.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(X_GITHUB_TOKEN)
            .map(|v| v.as_bytes().trim_ascii())
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Authorization: Bearer <token>` value, marked sensitive.
    pub fn authorization(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut raw = Vec::with_capacity(7 + self.0.len());
        raw.extend_from_slice(b"Bearer ");
        raw.extend_from_slice(&self.0);

        let mut value = HeaderValue::from_bytes(&raw)?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Short form safe for logs: the first four characters and the length.
    pub fn redacted(&self) -> String {
        if self.0.is_empty() {
            return "<empty>".to_string();
        }
        let text = String::from_utf8_lossy(&self.0);
        let prefix: String = text.chars().take(4).collect();
        format!("{}… ({} bytes)", prefix, self.0.len())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}
