//! Transaction gateway library.
//!
//! Accepts a transaction from a caller, broadcasts it to an upstream
//! transaction service, then polls the upstream for the transaction's status
//! on a fixed delay until it leaves `PENDING` or the retry budget runs out.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (bind, validate, X-Request-ID)
//!                          │
//!                          ▼
//!                     tracking (BroadcastTracker / StatusQuery)
//!                          │
//!                          ▼
//!                     resilience (RequestContext deadline + abort, StatusPoller)
//!                          │
//!                          ▼
//!                     upstream (UpstreamClient: broadcast, check_status)
//!                          │
//!                          ▼
//!                     Upstream transaction service
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod tracking;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use tracking::{BroadcastTracker, StatusQuery, TrackOutcome};
pub use upstream::{GatewayError, TransactionId, TransactionStatus, UpstreamClient};
