//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to upstream:
//!     → timeouts.rs (race the call against deadline and shutdown abort)
//!     → On PENDING: retries.rs (wait fixed delay, check again, bounded budget)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call and every wait has a deadline
//! - Only the PENDING status is retried; transport and decode failures are not
//! - Per-call timeouts live in the upstream client, the request deadline here

pub mod retries;
pub mod timeouts;

pub use retries::{RetryPolicy, StatusPoller};
pub use timeouts::RequestContext;
