//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace span, body limit)
//!     → request.rs (X-Request-ID, bind, validate)
//!     → handlers.rs (build RequestContext, run workflow)
//!     → response.rs ({msg, tx_status, tx_hash}, status code)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use response::ApiResponse;
pub use server::HttpServer;
