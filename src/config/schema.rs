//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the transaction gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound route paths.
    pub routes: RoutesConfig,

    /// Upstream transaction service endpoints.
    pub upstream: UpstreamConfig,

    /// Retry budget for pending transactions.
    pub retry: RetryConfig,

    /// Request deadline and shutdown grace.
    pub timeouts: TimeoutConfig,

    /// Inbound request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Paths the gateway serves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Liveness probe.
    pub health: String,

    /// Broadcast-and-track endpoint (POST).
    pub broadcast: String,

    /// Status query endpoint (GET). Must contain the `{tx_hash}` capture.
    pub status: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            health: "/health".to_string(),
            broadcast: "/transactions".to_string(),
            status: "/transactions/{tx_hash}".to_string(),
        }
    }
}

/// Upstream transaction service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URL receiving `POST {symbol, price, timestamp}`.
    pub broadcast_url: String,

    /// Base URL for status checks; the tx hash is appended as a path segment.
    pub status_url: String,

    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,

    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle pooled connections per upstream host.
    pub pool_max_idle_per_host: usize,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            broadcast_url: "http://127.0.0.1:9000/broadcast".to_string(),
            status_url: "http://127.0.0.1:9000/check/".to_string(),
            timeout_ms: 5_000,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 32,
        }
    }
}

/// Retry configuration for pending transactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional status checks after the first one (0 disables retries).
    pub retry_times: u32,

    /// Fixed delay before each additional check in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_times: 5,
            retry_delay_ms: 2_000,
        }
    }
}

/// Timeout configuration for request handling and shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Overall deadline for one inbound request in seconds.
    pub request_secs: u64,

    /// How long in-flight requests may drain on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            shutdown_grace_secs: 10,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject transaction requests without an `X-Request-ID` header.
    /// When false a UUID v4 is generated instead.
    pub require_request_id: bool,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_request_id: true,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for production.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            broadcast_url = "https://node.example/broadcast"

            [retry]
            retry_times = 2

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.broadcast_url, "https://node.example/broadcast");
        assert_eq!(config.upstream.status_url, "http://127.0.0.1:9000/check/");
        assert_eq!(config.retry.retry_times, 2);
        assert_eq!(config.retry.retry_delay_ms, 2_000);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.routes.status, "/transactions/{tx_hash}");
    }

    #[test]
    fn test_duration_helpers() {
        let config = GatewayConfig::default();
        assert_eq!(config.timeouts.request(), Duration::from_secs(60));
        assert_eq!(config.upstream.timeout(), Duration::from_secs(5));
    }
}
