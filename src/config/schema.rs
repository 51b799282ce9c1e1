//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Persona appended to every relayed conversation unless configured otherwise.
pub const DEFAULT_PERSONA: &str =
    "You are a helpful assistant that replies to user messages as if you were the Blackbeard Pirate.";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream completions endpoint used by the relay.
    pub upstream: UpstreamConfig,

    /// Persona injection and credential policy.
    pub persona: PersonaConfig,

    /// Manual test chat served on `/test/chat`.
    pub demo_chat: DemoChatConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Outbound completions endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the chat completions endpoint.
    pub completions_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for the upstream request/response in seconds.
    pub request_timeout_secs: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            completions_url: "https://api.githubcopilot.com/chat/completions".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            user_agent: concat!("copilot-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Persona injection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// System instruction appended to every relayed conversation.
    pub instruction: String,

    /// Reject requests without an `X-GitHub-Token` header instead of
    /// forwarding an empty bearer upstream.
    pub require_credential: bool,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_PERSONA.to_string(),
            require_credential: true,
        }
    }
}

/// Settings for the `/test/chat` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoChatConfig {
    /// Enable the endpoint.
    pub enabled: bool,

    /// OpenAI-compatible completions URL.
    pub completions_url: String,

    /// Model requested from the demo endpoint.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Persona used by the demo chat.
    pub instruction: String,
}

impl Default for DemoChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            completions_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            instruction: DEFAULT_PERSONA.to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8081");
        assert_eq!(
            config.upstream.completions_url,
            "https://api.githubcopilot.com/chat/completions"
        );
        assert_eq!(config.persona.instruction, DEFAULT_PERSONA);
        assert!(config.persona.require_credential);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.upstream.request_timeout_secs, 30);
        assert_eq!(config.security.max_body_size, 2 * 1024 * 1024);
    }

    #[test]
    fn test_partial_section() {
        let config: RelayConfig = toml::from_str(
            r#"
            [persona]
            require_credential = false
            "#,
        )
        .unwrap();
        assert!(!config.persona.require_credential);
        assert_eq!(config.persona.instruction, DEFAULT_PERSONA);
    }
}
