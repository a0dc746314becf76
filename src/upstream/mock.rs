//! Scripted upstream used by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::resilience::timeouts::RequestContext;
use crate::upstream::types::{GatewayResult, TransactionId, TransactionRequest, TransactionStatus};
use crate::upstream::UpstreamClient;

/// Replays a fixed broadcast answer and a queue of status answers.
///
/// Once the queue runs dry the last status answer is repeated.
pub(crate) struct ScriptedUpstream {
    broadcast: GatewayResult<TransactionId>,
    statuses: Mutex<VecDeque<GatewayResult<TransactionStatus>>>,
    last_status: Mutex<GatewayResult<TransactionStatus>>,
    status_delay: Duration,
    broadcast_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedUpstream {
    pub fn new(tx_hash: &str) -> Self {
        Self {
            broadcast: Ok(TransactionId::from(tx_hash)),
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(Ok(TransactionStatus::Pending)),
            status_delay: Duration::ZERO,
            broadcast_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_broadcast(mut self, result: GatewayResult<TransactionId>) -> Self {
        self.broadcast = result;
        self
    }

    pub fn with_statuses<I>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = GatewayResult<TransactionStatus>>,
    {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn broadcast_calls(&self) -> usize {
        self.broadcast_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn broadcast(
        &self,
        _ctx: &RequestContext,
        _request: &TransactionRequest,
    ) -> GatewayResult<TransactionId> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        self.broadcast.clone()
    }

    async fn check_status(
        &self,
        _ctx: &RequestContext,
        _tx_id: &TransactionId,
    ) -> GatewayResult<TransactionStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }

        let next = self.statuses.lock().unwrap().pop_front();
        let mut last = self.last_status.lock().unwrap();
        if let Some(result) = next {
            *last = result;
        }
        last.clone()
    }
}
