//! Out-of-band status lookup for callers that poll on their own.

use std::sync::Arc;

use crate::observability::metrics;
use crate::resilience::timeouts::RequestContext;
use crate::upstream::types::{GatewayResult, TransactionId, TransactionStatus};
use crate::upstream::UpstreamClient;

/// Single pass-through status check. No retry, no caching.
#[derive(Clone)]
pub struct StatusQuery {
    upstream: Arc<dyn UpstreamClient>,
}

impl StatusQuery {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }

    pub async fn run(
        &self,
        ctx: &RequestContext,
        tx_id: &TransactionId,
    ) -> GatewayResult<TransactionStatus> {
        let result = ctx.run(self.upstream.check_status(ctx, tx_id)).await;
        match &result {
            Ok(status) => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    tx_hash = %tx_id,
                    tx_status = %status,
                    "Status query answered"
                );
                metrics::record_workflow("status", "answered");
            }
            Err(e) => metrics::record_workflow("status", e.kind()),
        }
        result
    }
}
