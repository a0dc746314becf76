//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics before anything else logs
//! - Build the pooled upstream client and the HTTP server
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, GatewayConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::upstream::ClientBuildError;

/// Anything that stops the gateway from coming up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] ClientBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve configuration from `path`, or validated defaults when absent.
pub fn resolve_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Bring the gateway up and serve until a shutdown signal arrives.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let config = resolve_config(config_path)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "tx-gateway starting"
    );

    if config.observability.metrics_enabled {
        let raw = &config.observability.metrics_address;
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| StartupError::MetricsAddress(raw.clone()))?;
        metrics::init_metrics(addr)?;
        tracing::info!(address = %addr, "Metrics exporter listening");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        broadcast_url = %config.upstream.broadcast_url,
        status_url = %config.upstream.status_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, shutdown.clone())?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = resolve_config(None).unwrap();
        assert_eq!(config.retry.retry_times, 5);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = resolve_config(Some(Path::new("/no/such/gateway.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
