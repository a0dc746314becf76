//! Transaction endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::http::request::{BroadcastBody, RequestId};
use crate::http::response::{
    Reply, CANNOT_BIND, CANNOT_BROADCAST, CANNOT_CHECK, MISSING_REQUEST_ID, TX_HASH_INVALID,
};
use crate::http::server::AppState;
use crate::upstream::types::TransactionId;

pub async fn health() -> &'static str {
    "Service is healthy!"
}

/// Broadcast a transaction and wait for a final answer.
pub async fn broadcast_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<BroadcastBody>, JsonRejection>,
) -> Reply {
    let _in_flight = state.shutdown.track();

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::error!(error = %rejection, "Cannot bind request");
            return Reply::bad_request(CANNOT_BIND);
        }
    };

    let Some(request_id) = RequestId::from_headers(&headers, state.security.require_request_id)
    else {
        tracing::info!("Request header is invalid, X-Request-ID missing");
        return Reply::bad_request(MISSING_REQUEST_ID);
    };

    let request = match body.validate() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(request_id = %request_id, error = %e, "Request body is invalid");
            return Reply::invalid(e).with_request_id(&request_id);
        }
    };

    let ctx = state.context(&request_id);
    match state.tracker.run(&ctx, &request).await {
        Ok(outcome) => Reply::tracked(&outcome, &state.routes.status).with_request_id(&request_id),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Cannot broadcast and check for transactions"
            );
            Reply::failure(&e, CANNOT_BROADCAST).with_request_id(&request_id)
        }
    }
}

/// Look up the current status of a transaction once.
pub async fn query_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tx_hash): Path<String>,
) -> Reply {
    let _in_flight = state.shutdown.track();

    let Some(request_id) = RequestId::from_headers(&headers, state.security.require_request_id)
    else {
        tracing::info!("Request header is invalid, X-Request-ID missing");
        return Reply::bad_request(MISSING_REQUEST_ID);
    };

    let tx_hash = tx_hash.trim();
    if tx_hash.is_empty() {
        return Reply::bad_request(TX_HASH_INVALID).with_request_id(&request_id);
    }

    let ctx = state.context(&request_id);
    match state.query.run(&ctx, &TransactionId::new(tx_hash)).await {
        Ok(status) => Reply::status(status).with_request_id(&request_id),
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                tx_hash = %tx_hash,
                error = %e,
                "Cannot check for transactions"
            );
            Reply::failure(&e, CANNOT_CHECK).with_request_id(&request_id)
        }
    }
}
