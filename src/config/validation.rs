//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    check_url(
        &mut errors,
        "upstream.completions_url",
        &config.upstream.completions_url,
    );
    check_nonzero(
        &mut errors,
        "upstream.connect_timeout_secs",
        config.upstream.connect_timeout_secs,
    );
    check_nonzero(
        &mut errors,
        "upstream.request_timeout_secs",
        config.upstream.request_timeout_secs,
    );
    check_nonzero(&mut errors, "timeouts.request_secs", config.timeouts.request_secs);
    check_nonzero(
        &mut errors,
        "security.max_body_size",
        config.security.max_body_size as u64,
    );

    if config.persona.instruction.trim().is_empty() {
        errors.push(ValidationError::Empty("persona.instruction"));
    }

    if config.demo_chat.enabled {
        check_url(
            &mut errors,
            "demo_chat.completions_url",
            &config.demo_chat.completions_url,
        );
        if config.demo_chat.model.trim().is_empty() {
            errors.push(ValidationError::Empty("demo_chat.model"));
        }
        if config.demo_chat.instruction.trim().is_empty() {
            errors.push(ValidationError::Empty("demo_chat.instruction"));
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero(field));
    }
}
