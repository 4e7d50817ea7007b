//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals parse, limits > 0, addresses valid)
//! - Detect duplicate seed accounts and tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::ServiceConfig;
use crate::scheduler::parse_interval;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be greater than 0"));
    }

    let gateway = &config.gateway;
    if !gateway.path.starts_with('/') {
        errors.push(ValidationError::new("gateway.path", "must start with '/'"));
    }
    if let Err(e) = parse_interval(&gateway.reaper_interval) {
        errors.push(ValidationError::new("gateway.reaper_interval", e.to_string()));
    }
    if let Err(e) = parse_interval(&gateway.rate_window) {
        errors.push(ValidationError::new("gateway.rate_window", e.to_string()));
    }
    if gateway.max_messages_per_window == 0 {
        errors.push(ValidationError::new("gateway.max_messages_per_window", "must be greater than 0"));
    }
    if gateway.heartbeat_interval_ms == 0 {
        errors.push(ValidationError::new("gateway.heartbeat_interval_ms", "must be greater than 0"));
    }
    if Duration::from_secs(gateway.heartbeat_grace_secs)
        < Duration::from_millis(gateway.heartbeat_interval_ms)
    {
        errors.push(ValidationError::new(
            "gateway.heartbeat_grace_secs",
            "must not be shorter than the heartbeat interval",
        ));
    }
    if gateway.outbound_buffer == 0 {
        errors.push(ValidationError::new("gateway.outbound_buffer", "must be greater than 0"));
    }
    if gateway.send_timeout_ms == 0 {
        errors.push(ValidationError::new("gateway.send_timeout_ms", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let mut ids = HashSet::new();
    let mut tokens = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        if !ids.insert(account.id.as_str()) {
            errors.push(ValidationError::new(
                format!("accounts[{i}].id"),
                format!("duplicate account id '{}'", account.id),
            ));
        }
        for token in &account.tokens {
            if !tokens.insert(token.as_str()) {
                errors.push(ValidationError::new(
                    format!("accounts[{i}].tokens"),
                    "token already issued to another account",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
