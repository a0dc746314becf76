//! Transaction types, upstream wire shapes and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A transaction submitted for broadcast.
///
/// Serialized verbatim as the upstream broadcast body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub symbol: String,
    pub price: u64,
    /// Unix time, seconds or milliseconds (10-13 digits).
    pub timestamp: u64,
}

/// Opaque identifier (`tx_hash`) returned by the broadcast call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a transaction's status as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "DNE")]
    DoesNotExist,
}

impl TransactionStatus {
    /// Pending is the only status worth asking about again.
    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Confirmed => "CONFIRMED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::DoesNotExist => "DNE",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body returned by the upstream broadcast endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct BroadcastResponse {
    pub tx_hash: String,
}

/// Body returned by the upstream status endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub tx_status: TransactionStatus,
}

/// Why a workflow instance stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The per-request deadline elapsed.
    DeadlineElapsed,
    /// The process is shutting down and the drain grace period ran out.
    Shutdown,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::DeadlineElapsed => f.write_str("request deadline elapsed"),
            CancelReason::Shutdown => f.write_str("gateway shutting down"),
        }
    }
}

/// Errors that can occur while broadcasting or tracking a transaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport failure, timeout or 5xx while calling upstream.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered but the body did not have the expected shape.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// Aborted by deadline or shutdown.
    #[error("cancelled: {0}")]
    Cancelled(CancelReason),
}

impl GatewayError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnavailable(_) => "unavailable",
            GatewayError::Decode(_) => "decode",
            GatewayError::Cancelled(_) => "cancelled",
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
