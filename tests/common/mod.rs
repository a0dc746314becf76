//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use tx_gateway::config::GatewayConfig;
use tx_gateway::http::HttpServer;
use tx_gateway::lifecycle::Shutdown;

/// Behaviour of the mock upstream transaction service.
#[derive(Clone)]
pub struct Script {
    pub tx_hash: String,
    pub broadcast_code: u16,
    pub status_code: u16,
    /// Checks before this index answer normally even when `status_code` is an error.
    pub status_failures_from: usize,
    /// Served in order; the last one repeats once the queue is drained.
    pub statuses: Vec<&'static str>,
    pub status_delay: Duration,
}

impl Script {
    pub fn new(tx_hash: &str, statuses: &[&'static str]) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            broadcast_code: 200,
            status_code: 200,
            status_failures_from: 0,
            statuses: statuses.to_vec(),
            status_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
struct MockState {
    script: Script,
    queue: Arc<Mutex<VecDeque<&'static str>>>,
    last: Arc<Mutex<&'static str>>,
    broadcast_calls: Arc<AtomicUsize>,
    status_calls: Arc<AtomicUsize>,
    request_ids: Arc<Mutex<Vec<String>>>,
    checked: Arc<Mutex<Vec<String>>>,
}

/// Programmable upstream bound to an ephemeral local port.
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockUpstream {
    pub async fn start(script: Script) -> Self {
        let state = MockState {
            queue: Arc::new(Mutex::new(script.statuses.iter().copied().collect())),
            last: Arc::new(Mutex::new("PENDING")),
            script,
            broadcast_calls: Arc::new(AtomicUsize::new(0)),
            status_calls: Arc::new(AtomicUsize::new(0)),
            request_ids: Arc::new(Mutex::new(Vec::new())),
            checked: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/broadcast", post(broadcast))
            .route("/check/{tx_hash}", get(check))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Gateway config pointed at this upstream with a short poll delay.
    pub fn gateway_config(&self, retry_times: u32) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.upstream.broadcast_url = format!("http://{}/broadcast", self.addr);
        config.upstream.status_url = format!("http://{}/check/", self.addr);
        config.retry.retry_times = retry_times;
        config.retry.retry_delay_ms = 20;
        config
    }

    pub fn broadcast_calls(&self) -> usize {
        self.state.broadcast_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.state.status_calls.load(Ordering::SeqCst)
    }

    pub fn request_ids(&self) -> Vec<String> {
        self.state.request_ids.lock().unwrap().clone()
    }

    pub fn checked_hashes(&self) -> Vec<String> {
        self.state.checked.lock().unwrap().clone()
    }
}

fn remember_request_id(state: &MockState, headers: &HeaderMap) {
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        state.request_ids.lock().unwrap().push(id.to_string());
    }
}

async fn broadcast(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.broadcast_calls.fetch_add(1, Ordering::SeqCst);
    remember_request_id(&state, &headers);

    let code = StatusCode::from_u16(state.script.broadcast_code).unwrap();
    if !code.is_success() {
        return (code, "upstream failure").into_response();
    }
    Json(json!({ "tx_hash": state.script.tx_hash })).into_response()
}

async fn check(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(tx_hash): Path<String>,
) -> Response {
    let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
    remember_request_id(&state, &headers);
    state.checked.lock().unwrap().push(tx_hash);

    if !state.script.status_delay.is_zero() {
        tokio::time::sleep(state.script.status_delay).await;
    }

    let code = StatusCode::from_u16(state.script.status_code).unwrap();
    if !code.is_success() && call >= state.script.status_failures_from {
        return (code, "upstream failure").into_response();
    }

    let next = state.queue.lock().unwrap().pop_front();
    let status = match next {
        Some(status) => {
            *state.last.lock().unwrap() = status;
            status
        }
        None => *state.last.lock().unwrap(),
    };
    Json(json!({ "tx_status": status })).into_response()
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, shutdown.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn tx_body(timestamp: u64) -> serde_json::Value {
    json!({ "symbol": "ETH", "price": 4500, "timestamp": timestamp })
}
