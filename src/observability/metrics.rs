//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_upstream_calls_total` (counter): upstream calls by call, outcome
//! - `gateway_upstream_call_duration_seconds` (histogram): upstream latency by call
//! - `gateway_status_retries_total` (counter): status checks made because of PENDING
//! - `gateway_workflows_total` (counter): finished workflows by workflow, outcome
//!
//! Without an installed recorder every function here is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::upstream::types::GatewayResult;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one upstream call and its latency.
pub fn record_upstream_call<T>(call: &'static str, result: &GatewayResult<T>, started: Instant) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    counter!("gateway_upstream_calls_total", "call" => call, "outcome" => outcome).increment(1);
    histogram!("gateway_upstream_call_duration_seconds", "call" => call)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_status_retry() {
    counter!("gateway_status_retries_total").increment(1);
}

pub fn record_workflow(workflow: &'static str, outcome: &'static str) {
    counter!("gateway_workflows_total", "workflow" => workflow, "outcome" => outcome).increment(1);
}
