//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limits)
//! - Build the upstream client and workflows once per process
//! - Bind server to listener
//! - Drain in-flight workflows on shutdown, abort them after the grace period

use axum::{
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::{GatewayConfig, RoutesConfig, SecurityConfig, TimeoutConfig};
use crate::http::handlers::{broadcast_transaction, health, query_status};
use crate::http::request::RequestId;
use crate::lifecycle::Shutdown;
use crate::observability::tracing::request_span;
use crate::resilience::retries::{RetryPolicy, StatusPoller};
use crate::resilience::timeouts::RequestContext;
use crate::tracking::{BroadcastTracker, StatusQuery};
use crate::upstream::{ClientBuildError, HttpUpstream, UpstreamClient};

/// How long the server may keep running after in-flight work was aborted.
const FORCE_EXIT_AFTER_ABORT: Duration = Duration::from_secs(1);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: BroadcastTracker,
    pub query: StatusQuery,
    pub routes: RoutesConfig,
    pub security: SecurityConfig,
    pub timeouts: TimeoutConfig,
    pub shutdown: Shutdown,
}

impl AppState {
    /// Fresh context for one inbound request.
    pub fn context(&self, request_id: &RequestId) -> RequestContext {
        RequestContext::new(
            request_id.as_str(),
            self.timeouts.request(),
            self.shutdown.abort_receiver(),
        )
    }
}

/// HTTP server for the transaction gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server talking to the configured upstream.
    pub fn new(config: GatewayConfig, shutdown: Shutdown) -> Result<Self, ClientBuildError> {
        let upstream: Arc<dyn UpstreamClient> = Arc::new(HttpUpstream::new(&config.upstream)?);
        Ok(Self::with_upstream(config, upstream, shutdown))
    }

    /// Create a new HTTP server around an existing upstream client.
    pub fn with_upstream(
        config: GatewayConfig,
        upstream: Arc<dyn UpstreamClient>,
        shutdown: Shutdown,
    ) -> Self {
        let policy = RetryPolicy::from(&config.retry);
        let poller = StatusPoller::new(upstream.clone(), policy);

        let state = AppState {
            tracker: BroadcastTracker::new(upstream.clone(), poller),
            query: StatusQuery::new(upstream),
            routes: config.routes.clone(),
            security: config.security.clone(),
            timeouts: config.timeouts.clone(),
            shutdown: shutdown.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            shutdown,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.routes.health, get(health))
            .route(&config.routes.broadcast, post(broadcast_transaction))
            .route(&config.routes.status, get(query_status))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// Run the server until the shutdown coordinator fires and in-flight work drains.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            retry_times = self.config.retry.retry_times,
            retry_delay_ms = self.config.retry.retry_delay_ms,
            "HTTP server starting"
        );

        let mut stop_rx = self.shutdown.subscribe();
        let mut grace_rx = self.shutdown.subscribe();
        let grace = self.config.timeouts.shutdown_grace();
        let shutdown = self.shutdown.clone();

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.recv().await;
                tracing::info!("Shutdown signal received, draining in-flight requests");
            })
            .into_future();

        let force_abort = async move {
            let _ = grace_rx.recv().await;
            tokio::time::sleep(grace).await;
            tracing::warn!(
                in_flight = shutdown.in_flight(),
                grace_secs = grace.as_secs(),
                "Grace period elapsed, aborting in-flight requests"
            );
            shutdown.abort_in_flight();
            tokio::time::sleep(FORCE_EXIT_AFTER_ABORT).await;
        };

        tokio::select! {
            result = server => result?,
            _ = force_abort => {
                tracing::warn!("Server still busy after abort, stopping anyway");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
