//! Shutdown coordination for the gateway.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks subscribe to, an
/// abort flag every request context watches, and a count of workflow
/// instances still in flight.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
    /// Raised once the drain grace period is over.
    abort_tx: Arc<watch::Sender<bool>>,
    /// Workflow instances currently running.
    in_flight: Arc<AtomicUsize>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        let (abort_tx, _) = watch::channel(false);
        Self {
            tx,
            abort_tx: Arc::new(abort_tx),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Receiver handed to each request context.
    pub fn abort_receiver(&self) -> watch::Receiver<bool> {
        self.abort_tx.subscribe()
    }

    /// Tell every in-flight workflow to stop now.
    pub fn abort_in_flight(&self) {
        self.abort_tx.send_replace(true);
    }

    /// Record a running workflow instance. The count drops when the guard does.
    pub fn track(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Number of workflow instances still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks one workflow instance's lifetime.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
