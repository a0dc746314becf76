//! Broadcast a transaction and track it to a final answer.

use std::sync::Arc;

use crate::observability::metrics;
use crate::resilience::retries::StatusPoller;
use crate::resilience::timeouts::RequestContext;
use crate::upstream::types::{GatewayResult, TransactionId, TransactionRequest, TransactionStatus};
use crate::upstream::UpstreamClient;

/// Final answer of a broadcast-and-track run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Upstream reported a terminal status.
    Terminal {
        status: TransactionStatus,
        tx_id: TransactionId,
    },
    /// Still pending after the whole retry budget was spent.
    PendingExhausted {
        tx_id: TransactionId,
        retry_times: u32,
    },
}

impl TrackOutcome {
    pub fn tx_id(&self) -> &TransactionId {
        match self {
            TrackOutcome::Terminal { tx_id, .. } => tx_id,
            TrackOutcome::PendingExhausted { tx_id, .. } => tx_id,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TrackOutcome::Terminal { .. } => "terminal",
            TrackOutcome::PendingExhausted { .. } => "pending_exhausted",
        }
    }
}

/// Composes broadcast, a first status check and the poller.
#[derive(Clone)]
pub struct BroadcastTracker {
    upstream: Arc<dyn UpstreamClient>,
    poller: StatusPoller,
}

impl BroadcastTracker {
    pub fn new(upstream: Arc<dyn UpstreamClient>, poller: StatusPoller) -> Self {
        Self { upstream, poller }
    }

    /// Broadcast `request` and follow it until it is terminal or the budget runs out.
    ///
    /// Failures of the broadcast or the first status check end the run at once.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        request: &TransactionRequest,
    ) -> GatewayResult<TrackOutcome> {
        let result = self.track(ctx, request).await;
        match &result {
            Ok(outcome) => metrics::record_workflow("broadcast", outcome.label()),
            Err(e) => metrics::record_workflow("broadcast", e.kind()),
        }
        result
    }

    async fn track(
        &self,
        ctx: &RequestContext,
        request: &TransactionRequest,
    ) -> GatewayResult<TrackOutcome> {
        let tx_id = ctx.run(self.upstream.broadcast(ctx, request)).await?;

        let initial = ctx.run(self.upstream.check_status(ctx, &tx_id)).await?;
        tracing::info!(
            request_id = %ctx.request_id(),
            tx_hash = %tx_id,
            tx_status = %initial,
            "Initial status received"
        );

        let status = self.poller.poll(ctx, &tx_id, initial).await?;
        if status.is_pending() {
            return Ok(TrackOutcome::PendingExhausted {
                tx_id,
                retry_times: self.poller.policy().retry_times,
            });
        }

        Ok(TrackOutcome::Terminal { status, tx_id })
    }
}
