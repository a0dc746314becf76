//! Upstream transaction service integration.
//!
//! # Data Flow
//! ```text
//! TransactionRequest
//!     → client.rs (POST broadcast_url, JSON body)      → TransactionId
//! TransactionId
//!     → client.rs (GET status_url/<tx_hash>)           → TransactionStatus
//! ```
//!
//! # Constraints
//! - Every call is a single attempt bounded by the per-call timeout
//! - Retrying is the poll engine's job, never this layer's
//! - One pooled HTTP client per process, shared by all workflow instances

use async_trait::async_trait;

use crate::resilience::timeouts::RequestContext;

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ClientBuildError, HttpUpstream};
pub use types::{
    CancelReason, GatewayError, GatewayResult, TransactionId, TransactionRequest,
    TransactionStatus,
};

/// The two upstream capabilities the gateway composes.
///
/// Implementations must be safe to share between concurrent workflow
/// instances.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Submit a transaction and return the identifier assigned upstream.
    async fn broadcast(
        &self,
        ctx: &RequestContext,
        request: &TransactionRequest,
    ) -> GatewayResult<TransactionId>;

    /// Query the current status of a previously broadcast transaction.
    async fn check_status(
        &self,
        ctx: &RequestContext,
        tx_id: &TransactionId,
    ) -> GatewayResult<TransactionStatus>;
}
