//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check upstream URLs and route shapes (distinct, rooted)
//! - Keep the worst-case retry wait inside the request deadline
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// Longest request deadline accepted (one day).
pub const MAX_REQUEST_SECS: u64 = 86_400;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic constraint and report all violations.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for (field, path) in [
        ("routes.health", &config.routes.health),
        ("routes.broadcast", &config.routes.broadcast),
        ("routes.status", &config.routes.status),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, format!("'{}' must start with '/'", path)));
        }
    }
    let routes = [
        &config.routes.health,
        &config.routes.broadcast,
        &config.routes.status,
    ];
    for (i, path) in routes.iter().enumerate() {
        if routes[..i].contains(path) {
            errors.push(ValidationError::new(
                "routes",
                format!("'{}' is used by more than one route", path),
            ));
        }
    }
    if !config.routes.status.contains("{tx_hash}") {
        errors.push(ValidationError::new(
            "routes.status",
            "must contain the {tx_hash} capture",
        ));
    }

    check_url(&mut errors, "upstream.broadcast_url", &config.upstream.broadcast_url);
    check_url(&mut errors, "upstream.status_url", &config.upstream.status_url);

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.timeout_ms", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if config.timeouts.request_secs > MAX_REQUEST_SECS {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!("must be at most {} seconds", MAX_REQUEST_SECS),
        ));
    }

    let retry_wait = Duration::from_millis(config.retry.retry_delay_ms)
        .saturating_mul(config.retry.retry_times);
    if config.timeouts.request_secs > 0 && retry_wait >= config.timeouts.request() {
        errors.push(ValidationError::new(
            "retry",
            format!(
                "retry_times * retry_delay_ms ({} ms) must be shorter than timeouts.request_secs",
                retry_wait.as_millis()
            ),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not a log level", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("'{}': {}", value, e))),
    }
}
