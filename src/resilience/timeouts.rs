//! Deadline and cancellation enforcement.
//!
//! # Responsibilities
//! - Carry the correlation id, deadline and abort signal of one request
//! - Race every outbound call and every wait against both
//! - Turn an elapsed deadline or a shutdown abort into `Cancelled`
//!
//! # Design Decisions
//! - Uses Tokio's timer and `watch` channel facilities
//! - Cancellation errors are distinct from upstream errors
//! - An abort wins over a deadline, which wins over a finished call

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::upstream::types::{CancelReason, GatewayError, GatewayResult};

/// Per-request context for one workflow instance.
///
/// Built by the acceptance layer when a request arrives and handed to every
/// component call; never shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    deadline: Instant,
    abort: watch::Receiver<bool>,
}

impl RequestContext {
    /// Create a context expiring `timeout` from now.
    ///
    /// `abort` flips to `true` when the process gives up on in-flight work.
    pub fn new(
        request_id: impl Into<String>,
        timeout: Duration,
        abort: watch::Receiver<bool>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: deadline_after(timeout),
            abort,
        }
    }

    /// Create a context that can only be cancelled by its deadline.
    pub fn detached(request_id: impl Into<String>, timeout: Duration) -> Self {
        let (_tx, abort) = watch::channel(false);
        Self::new(request_id, timeout, abort)
    }

    /// Correlation id of the inbound request.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Drive `fut` to completion unless the deadline elapses or an abort arrives first.
    pub async fn run<T, F>(&self, fut: F) -> GatewayResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.aborted() => Err(GatewayError::Cancelled(CancelReason::Shutdown)),
            _ = tokio::time::sleep_until(self.deadline) => {
                Err(GatewayError::Cancelled(CancelReason::DeadlineElapsed))
            }
            result = fut => result,
        }
    }

    /// Sleep for `delay`, waking early with `Cancelled` if the request is cancelled.
    pub async fn sleep(&self, delay: Duration) -> GatewayResult<()> {
        self.run(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }

    /// Resolves once the abort flag is raised. Never resolves if the sender is gone.
    async fn aborted(&self) {
        let mut abort = self.abort.clone();
        let closed = abort.wait_for(|aborted| *aborted).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// `now + timeout`, clamped to roughly thirty years out.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}
