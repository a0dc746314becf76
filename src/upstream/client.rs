//! HTTP client for the upstream broadcast and status endpoints.
//!
//! # Responsibilities
//! - Own the process-wide connection pool
//! - Serialize requests and decode responses
//! - Bound every call by the configured timeout
//! - Forward the correlation id upstream

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::resilience::timeouts::RequestContext;
use crate::upstream::types::{
    BroadcastResponse, GatewayError, GatewayResult, StatusResponse, TransactionId,
    TransactionRequest, TransactionStatus,
};
use crate::upstream::UpstreamClient;

/// Errors raised while building the upstream client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid {field} '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{field} '{value}' cannot take a path segment")]
    NotABase { field: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Upstream client backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    broadcast_url: Url,
    status_url: Url,
    timeout: Duration,
}

impl HttpUpstream {
    /// Create a new upstream client.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let broadcast_url = parse_url("upstream.broadcast_url", &config.broadcast_url)?;
        let status_url = parse_url("upstream.status_url", &config.status_url)?;
        if status_url.cannot_be_a_base() {
            return Err(ClientBuildError::NotABase {
                field: "upstream.status_url",
                value: config.status_url.clone(),
            });
        }

        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        tracing::info!(
            broadcast_url = %broadcast_url,
            status_url = %status_url,
            timeout_ms = config.timeout_ms,
            "Upstream client initialized"
        );

        Ok(Self {
            client,
            broadcast_url,
            status_url,
            timeout,
        })
    }

    /// Status endpoint for one transaction: `status_url` plus the id as last segment.
    pub fn status_url_for(&self, tx_id: &TransactionId) -> GatewayResult<Url> {
        let mut url = self.status_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::UpstreamUnavailable(format!(
                    "status url '{}' cannot take a path segment",
                    self.status_url
                ))
            })?
            .pop_if_empty()
            .push(tx_id.as_str());
        Ok(url)
    }

    fn transport_error(&self, call: &'static str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::UpstreamUnavailable(format!(
                "{} timed out after {} ms",
                call,
                self.timeout.as_millis()
            ))
        } else {
            GatewayError::UpstreamUnavailable(format!("{} request failed: {}", call, err))
        }
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        call: &'static str,
        response: reqwest::Response,
    ) -> GatewayResult<T> {
        let status = response.status();
        if status.is_server_error() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "{} returned HTTP {}",
                call, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(call, e))?;

        serde_json::from_slice(&body).map_err(|e| {
            GatewayError::Decode(format!("{} response (HTTP {}): {}", call, status, e))
        })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn broadcast(
        &self,
        ctx: &RequestContext,
        request: &TransactionRequest,
    ) -> GatewayResult<TransactionId> {
        let started = Instant::now();
        let result: GatewayResult<TransactionId> = async {
            let response = self
                .client
                .post(self.broadcast_url.clone())
                .header(X_REQUEST_ID, ctx.request_id())
                .json(request)
                .send()
                .await
                .map_err(|e| self.transport_error("broadcast", e))?;

            let body: BroadcastResponse = self.decode("broadcast", response).await?;
            if body.tx_hash.is_empty() {
                return Err(GatewayError::Decode(
                    "broadcast response carried an empty tx_hash".to_string(),
                ));
            }
            Ok(TransactionId::new(body.tx_hash))
        }
        .await;

        metrics::record_upstream_call("broadcast", &result, started);
        match &result {
            Ok(tx_id) => tracing::info!(
                request_id = %ctx.request_id(),
                tx_hash = %tx_id,
                "Broadcast accepted upstream"
            ),
            Err(e) => tracing::error!(
                request_id = %ctx.request_id(),
                error = %e,
                "Broadcast failed"
            ),
        }
        result
    }

    async fn check_status(
        &self,
        ctx: &RequestContext,
        tx_id: &TransactionId,
    ) -> GatewayResult<TransactionStatus> {
        let started = Instant::now();
        let result: GatewayResult<TransactionStatus> = async {
            let url = self.status_url_for(tx_id)?;
            let response = self
                .client
                .get(url)
                .header(X_REQUEST_ID, ctx.request_id())
                .send()
                .await
                .map_err(|e| self.transport_error("status check", e))?;

            let body: StatusResponse = self.decode("status check", response).await?;
            Ok(body.tx_status)
        }
        .await;

        metrics::record_upstream_call("status", &result, started);
        match &result {
            Ok(status) => tracing::debug!(
                request_id = %ctx.request_id(),
                tx_hash = %tx_id,
                tx_status = %status,
                "Status check succeeded"
            ),
            Err(e) => tracing::error!(
                request_id = %ctx.request_id(),
                tx_hash = %tx_id,
                error = %e,
                "Status check failed"
            ),
        }
        result
    }
}

impl std::fmt::Debug for HttpUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUpstream")
            .field("broadcast_url", &self.broadcast_url.as_str())
            .field("status_url", &self.status_url.as_str())
            .field("timeout_ms", &self.timeout.as_millis())
            .finish()
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ClientBuildError> {
    Url::parse(value).map_err(|source| ClientBuildError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}
