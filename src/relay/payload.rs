//! Conversation envelope sent by the chat-extension platform.
//!
//! # Responsibilities
//! - Define the typed conversation model
//! - Decode inbound request bodies into it
//!
//! # Design Decisions
//! - Unknown fields are ignored; the platform envelope keeps growing and only
//!   `copilot_thread_id` and `messages` matter here
//! - Attachment lists are carried as opaque JSON values
//! - Optional fields distinguish absent from `null`: absent stays absent,
//!   `null` is forwarded as `null`, so forwarding never invents or drops values

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Message roles understood by the upstream API.
pub mod role {
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const SYSTEM: &str = "system";
}

/// `name` carried by the platform's session-metadata message.
pub const SESSION_SENTINEL: &str = "_session";

/// Inbound body could not be decoded into a [`Conversation`].
#[derive(Debug, Error)]
#[error("invalid conversation payload: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl DecodeError {
    /// Line and column of the failure within the body.
    pub fn position(&self) -> (usize, usize) {
        (self.0.line(), self.0.column())
    }
}

/// An ordered chat history plus the platform's thread identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub copilot_thread_id: String,
    pub messages: Vec<Message>,
}

/// A field that may be absent, explicitly `null`, or set.
///
/// `None` is absent and is skipped on serialization; `Some(None)` is an
/// explicit `null` and is written back as `null`.
pub type Nullable<T> = Option<Option<T>>;

/// Deserialize a present field into `Some(..)` so explicit `null` survives.
/// Absent fields fall back to `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One turn of a conversation.
///
/// Numbers are kept as [`Number`] so `0` is forwarded as `0`, not `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub role: String,
    pub content: String,

    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Nullable<String>,

    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub copilot_references: Nullable<Vec<Value>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub copilot_confirmations: Nullable<Vec<Value>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub copilot_skills: Nullable<Vec<Value>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tools: Nullable<Vec<Value>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub functions: Nullable<Vec<Value>>,

    // Sampling parameters are accepted but never read by the relay.
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub temperature: Nullable<Number>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub top_p: Nullable<Number>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Nullable<Number>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Nullable<Number>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Nullable<Number>,

    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub stop: Nullable<Value>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub response_format: Nullable<Value>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub agent: Nullable<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub client_id: Nullable<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub model: Nullable<String>,
}

impl Message {
    /// A plain message with no attachments.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(role::SYSTEM, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(role::USER, content)
    }

    /// Whether this is the platform's session-metadata message.
    pub fn is_session_metadata(&self) -> bool {
        matches!(&self.name, Some(Some(name)) if name == SESSION_SENTINEL)
    }

    /// References attached to this message; empty when absent or `null`.
    pub fn references(&self) -> &[Value] {
        self.copilot_references
            .as_ref()
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }
}

/// Decode a raw request body into a [`Conversation`].
pub fn decode(body: &[u8]) -> Result<Conversation, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}
