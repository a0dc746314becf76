//! Status polling with a bounded retry budget.
//!
//! # Responsibilities
//! - Re-check a transaction while upstream reports it as pending
//! - Wait a fixed delay between checks
//! - Stop on the first terminal status, the first failure, or an empty budget
//!
//! # Design Decisions
//! - Pending is the only retryable status; everything else is terminal
//! - Fixed delay, no backoff: the total wait is `retry_times * retry_delay`
//! - A failed check aborts the whole poll; failures are never retried
//! - Checks for one transaction are strictly sequential

use std::sync::Arc;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::RequestContext;
use crate::upstream::types::{GatewayResult, TransactionId, TransactionStatus};
use crate::upstream::UpstreamClient;

/// Process-wide retry budget for pending transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional status checks allowed after the first one.
    pub retry_times: u32,
    /// Wait before each additional check.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retry_times: u32, retry_delay: Duration) -> Self {
        Self {
            retry_times,
            retry_delay,
        }
    }

    /// Longest time a fully pending poll spends waiting.
    pub fn total_wait(&self) -> Duration {
        self.retry_delay.saturating_mul(self.retry_times)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.retry_times, Duration::from_millis(config.retry_delay_ms))
    }
}

/// Polls upstream until a transaction leaves the pending state.
#[derive(Clone)]
pub struct StatusPoller {
    upstream: Arc<dyn UpstreamClient>,
    policy: RetryPolicy,
}

impl StatusPoller {
    pub fn new(upstream: Arc<dyn UpstreamClient>, policy: RetryPolicy) -> Self {
        Self { upstream, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Poll `tx_id` starting from an already observed `initial` status.
    ///
    /// Returns the last observed status: terminal if one showed up, or
    /// `Pending` once the budget is spent. Cancellation of `ctx` interrupts
    /// both the delay and an in-flight check.
    pub async fn poll(
        &self,
        ctx: &RequestContext,
        tx_id: &TransactionId,
        initial: TransactionStatus,
    ) -> GatewayResult<TransactionStatus> {
        let mut status = initial;

        for retry in 1..=self.policy.retry_times {
            if !status.is_pending() {
                break;
            }

            tracing::info!(
                request_id = %ctx.request_id(),
                tx_hash = %tx_id,
                retry = retry,
                delay_ms = self.policy.retry_delay.as_millis() as u64,
                "tx_status is pending, checking again"
            );
            ctx.sleep(self.policy.retry_delay).await?;

            metrics::record_status_retry();
            status = ctx.run(self.upstream.check_status(ctx, tx_id)).await?;
        }

        if status.is_pending() {
            tracing::warn!(
                request_id = %ctx.request_id(),
                tx_hash = %tx_id,
                retry_times = self.policy.retry_times,
                "Retry budget exhausted, transaction still pending"
            );
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::mock::ScriptedUpstream;
    use crate::upstream::types::{CancelReason, GatewayError};
    use crate::upstream::types::TransactionStatus::*;

    fn poller(upstream: &Arc<ScriptedUpstream>, retry_times: u32) -> StatusPoller {
        StatusPoller::new(
            upstream.clone(),
            RetryPolicy::new(retry_times, Duration::from_millis(5)),
        )
    }

    fn ctx() -> RequestContext {
        RequestContext::detached("req-test", Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_terminal_initial_status_makes_no_calls() {
        for retry_times in [0, 1, 5] {
            for initial in [Confirmed, Failed, DoesNotExist] {
                let upstream = Arc::new(ScriptedUpstream::new("abc123"));
                let status = poller(&upstream, retry_times)
                    .poll(&ctx(), &"abc123".into(), initial)
                    .await
                    .unwrap();

                assert_eq!(status, initial);
                assert_eq!(upstream.status_calls(), 0);
            }
        }
    }

    #[tokio::test]
    async fn test_all_pending_spends_exact_budget() {
        for retry_times in [0u32, 1, 3] {
            let upstream = Arc::new(ScriptedUpstream::new("abc123"));
            let status = poller(&upstream, retry_times)
                .poll(&ctx(), &"abc123".into(), Pending)
                .await
                .unwrap();

            assert_eq!(status, Pending);
            assert_eq!(upstream.status_calls(), retry_times as usize);
        }
    }

    #[tokio::test]
    async fn test_stops_on_first_terminal_status() {
        let upstream = Arc::new(
            ScriptedUpstream::new("abc123").with_statuses([Ok(Pending), Ok(Failed), Ok(Pending)]),
        );
        let status = poller(&upstream, 5)
            .poll(&ctx(), &"abc123".into(), Pending)
            .await
            .unwrap();

        assert_eq!(status, Failed);
        assert_eq!(upstream.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_aborts_with_budget_left() {
        let upstream = Arc::new(ScriptedUpstream::new("abc123").with_statuses([
            Ok(Pending),
            Err(GatewayError::Decode("unexpected body".into())),
            Ok(Confirmed),
        ]));
        let err = poller(&upstream, 5)
            .poll(&ctx(), &"abc123".into(), Pending)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Decode(_)));
        assert_eq!(upstream.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_deadline_cuts_retry_wait_short() {
        let upstream = Arc::new(ScriptedUpstream::new("abc123"));
        let poller = StatusPoller::new(
            upstream.clone(),
            RetryPolicy::new(3, Duration::from_secs(30)),
        );
        let ctx = RequestContext::detached("req-deadline", Duration::from_millis(50));
        let started = std::time::Instant::now();

        let err = poller
            .poll(&ctx, &"abc123".into(), Pending)
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::Cancelled(CancelReason::DeadlineElapsed));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(upstream.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_deadline_interrupts_slow_check() {
        let upstream = Arc::new(
            ScriptedUpstream::new("abc123").with_status_delay(Duration::from_secs(30)),
        );
        let poller = StatusPoller::new(upstream.clone(), RetryPolicy::new(2, Duration::ZERO));
        let ctx = RequestContext::detached("req-slow", Duration::from_millis(50));

        let err = poller
            .poll(&ctx, &"abc123".into(), Pending)
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::Cancelled(CancelReason::DeadlineElapsed));
        assert_eq!(upstream.status_calls(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            retry_times: 4,
            retry_delay_ms: 250,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.retry_times, 4);
        assert_eq!(policy.total_wait(), Duration::from_secs(1));
    }
}
