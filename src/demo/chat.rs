//! Persona-bound chat client behind `GET /test/chat`.
//!
//! Unlike the relay, this path authenticates with a key owned by the
//! process and returns only the generated text.

use serde::Deserialize;
use url::Url;

use crate::config::DemoChatConfig;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::payload::Message;
use crate::relay::upstream::{UpstreamClient, UpstreamRequest};
use crate::relay::Credential;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat client with a fixed system persona.
#[derive(Debug, Clone)]
pub struct DemoChat {
    upstream: UpstreamClient,
    completions_url: Url,
    model: String,
    instruction: String,
    api_key: Option<Credential>,
}

impl DemoChat {
    pub fn new(
        upstream: UpstreamClient,
        completions_url: Url,
        model: impl Into<String>,
        instruction: impl Into<String>,
        api_key: Option<Credential>,
    ) -> Self {
        Self {
            upstream,
            completions_url,
            model: model.into(),
            instruction: instruction.into(),
            api_key,
        }
    }

    /// Build from configuration, reading the API key from the environment
    /// variable named by `api_key_env`.
    pub fn from_config(
        upstream: UpstreamClient,
        config: &DemoChatConfig,
    ) -> Result<Self, url::ParseError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Credential::new);

        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No API key for demo chat, /test/chat will answer 503"
            );
        }

        Ok(Self::new(
            upstream,
            Url::parse(&config.completions_url)?,
            config.model.clone(),
            config.instruction.clone(),
            api_key,
        ))
    }

    /// Messages sent for a single user prompt.
    pub fn prompt(&self, message: &str) -> Vec<Message> {
        vec![Message::system(self.instruction.clone()), Message::user(message)]
    }

    /// Ask the model for a reply to `message` in the configured persona.
    pub async fn reply(&self, message: &str) -> RelayResult<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RelayError::DemoChatUnavailable("no API key configured"))?;

        let request = UpstreamRequest::new(self.prompt(message)).with_model(self.model.clone());
        let body = self
            .upstream
            .complete(&self.completions_url, api_key, &request)
            .await?;

        extract_content(&body)
    }
}

fn extract_content(body: &[u8]) -> RelayResult<String> {
    let response: CompletionResponse =
        serde_json::from_slice(body).map_err(|_| RelayError::DemoChatMalformed)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(RelayError::DemoChatMalformed)
}
