//! Transaction workflows.
//!
//! # Data Flow
//! ```text
//! Broadcast-and-track (broadcast.rs):
//!     broadcast → tx_hash
//!     → first status check
//!     → resilience::retries (poll while PENDING, fixed delay, bounded budget)
//!     → Terminal(status, tx_hash) | PendingExhausted(tx_hash, retry_times)
//!
//! Status query (query.rs):
//!     tx_hash → one status check → status
//! ```
//!
//! # Design Decisions
//! - One workflow instance per inbound request, no shared mutable state
//! - Broadcast always completes before any status check
//! - Upstream failures are surfaced, never retried as if they were PENDING

pub mod broadcast;
pub mod query;

pub use broadcast::{BroadcastTracker, TrackOutcome};
pub use query::StatusQuery;
