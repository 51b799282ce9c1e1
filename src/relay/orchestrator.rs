//! Relay orchestration: augment the conversation and forward it upstream.
//!
//! # Data Flow
//! ```text
//! Conversation (decoded)
//!     → append system persona message
//!     → UpstreamRequest { messages, stream: false }
//!     → UpstreamClient::complete (Bearer <credential>)
//!     → raw upstream body
//! ```

use axum::body::Bytes;
use url::Url;

use crate::relay::credential::Credential;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::payload::{Conversation, Message};
use crate::relay::upstream::{UpstreamClient, UpstreamRequest};

/// Forwards persona-augmented conversations to the completions endpoint.
#[derive(Debug, Clone)]
pub struct RelayOrchestrator {
    upstream: UpstreamClient,
    completions_url: Url,
    persona: String,
    require_credential: bool,
}

impl RelayOrchestrator {
    pub fn new(
        upstream: UpstreamClient,
        completions_url: Url,
        persona: impl Into<String>,
        require_credential: bool,
    ) -> Self {
        Self {
            upstream,
            completions_url,
            persona: persona.into(),
            require_credential,
        }
    }

    /// Append the persona instruction after the caller's messages.
    ///
    /// Existing system messages are left alone; the persona is always added.
    pub fn augment(&self, conversation: Conversation) -> Vec<Message> {
        let mut messages = conversation.messages;
        messages.push(Message::system(self.persona.clone()));
        messages
    }

    /// Build the request body sent upstream for `conversation`.
    pub fn build_request(&self, conversation: Conversation) -> UpstreamRequest {
        UpstreamRequest::new(self.augment(conversation))
    }

    /// Apply the credential policy.
    ///
    /// With `require_credential` unset, a missing token is forwarded as an
    /// empty bearer and left for the upstream to reject.
    pub fn resolve_credential(&self, credential: Option<Credential>) -> RelayResult<Credential> {
        match credential {
            Some(credential) => Ok(credential),
            None if self.require_credential => Err(RelayError::MissingCredential),
            None => {
                tracing::warn!("No credential supplied, forwarding empty bearer");
                Ok(Credential::default())
            }
        }
    }

    /// Run the full relay for one request and return the upstream body.
    pub async fn relay(
        &self,
        credential: Option<Credential>,
        conversation: Conversation,
    ) -> RelayResult<Bytes> {
        let credential = self.resolve_credential(credential)?;
        let thread_id = conversation.copilot_thread_id.clone();
        let request = self.build_request(conversation);

        tracing::debug!(
            thread_id = %thread_id,
            messages = request.messages.len(),
            "Relaying conversation"
        );

        let body = self
            .upstream
            .complete(&self.completions_url, &credential, &request)
            .await?;
        Ok(body)
    }
}
