//! Response rendering.
//!
//! # Responsibilities
//! - Render workflow outcomes as `{msg, tx_status?, tx_hash?}`
//! - Map gateway errors to HTTP status codes
//! - Echo the request's `X-Request-ID`
//!
//! # Design Decisions
//! - Upstream failures are 502, deadline expiry 504, shutdown abort 503
//! - A pending transaction after the whole retry budget is a 200, not an error

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::request::{InvalidRequest, RequestId, X_REQUEST_ID};
use crate::tracking::TrackOutcome;
use crate::upstream::types::{CancelReason, GatewayError, TransactionStatus};

pub const CANNOT_BIND: &str = "Cannot bind request";
pub const MISSING_REQUEST_ID: &str = "Request header is invalid, X-Request-ID is REQUIRED";
pub const BODY_INVALID: &str = "Request body is invalid";
pub const TIMESTAMP_INVALID: &str = "timestamp is invalid";
pub const TX_HASH_INVALID: &str = "tx_hash is invalid";
pub const CHECK_SUCCESS: &str = "Status checking success";
pub const CANNOT_BROADCAST: &str = "Cannot broadcast and check for transactions";
pub const CANNOT_CHECK: &str = "Cannot check for transactions";

/// JSON body of every transaction endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl ApiResponse {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            tx_status: None,
            tx_hash: None,
        }
    }
}

/// Status code, body and correlation id of one response.
#[derive(Debug)]
pub struct Reply {
    status: StatusCode,
    body: ApiResponse,
    request_id: Option<RequestId>,
}

impl Reply {
    pub fn new(status: StatusCode, body: ApiResponse) -> Self {
        Self {
            status,
            body,
            request_id: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiResponse::message(msg))
    }

    pub fn invalid(err: InvalidRequest) -> Self {
        match err {
            InvalidRequest::TimestampDigits(_) => Self::bad_request(TIMESTAMP_INVALID),
            _ => Self::bad_request(BODY_INVALID),
        }
    }

    /// Render the outcome of a broadcast-and-track run.
    pub fn tracked(outcome: &TrackOutcome, status_route: &str) -> Self {
        let body = match outcome {
            TrackOutcome::Terminal { status, tx_id } => ApiResponse {
                msg: CHECK_SUCCESS.to_string(),
                tx_status: Some(*status),
                tx_hash: Some(tx_id.to_string()),
            },
            TrackOutcome::PendingExhausted { tx_id, retry_times } => ApiResponse {
                msg: format!(
                    "After retry {} times, status are still {}, please check via {}",
                    retry_times,
                    TransactionStatus::Pending,
                    status_route
                ),
                tx_status: None,
                tx_hash: Some(tx_id.to_string()),
            },
        };
        Self::new(StatusCode::OK, body)
    }

    /// Render the answer of a status query.
    pub fn status(status: TransactionStatus) -> Self {
        Self::new(
            StatusCode::OK,
            ApiResponse {
                msg: CHECK_SUCCESS.to_string(),
                tx_status: Some(status),
                tx_hash: None,
            },
        )
    }

    /// Render a workflow failure with the endpoint's failure message.
    pub fn failure(err: &GatewayError, msg: &str) -> Self {
        let status = match err {
            GatewayError::UpstreamUnavailable(_) | GatewayError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Cancelled(CancelReason::DeadlineElapsed) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Cancelled(CancelReason::Shutdown) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, ApiResponse::message(msg))
    }

    pub fn with_request_id(mut self, request_id: &RequestId) -> Self {
        self.request_id = Some(request_id.clone());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ApiResponse {
        &self.body
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(id) = self.request_id {
            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::types::TransactionId;

    #[test]
    fn test_pending_exhausted_message() {
        let outcome = TrackOutcome::PendingExhausted {
            tx_id: TransactionId::from("abc123"),
            retry_times: 2,
        };
        let reply = Reply::tracked(&outcome, "/transactions/{tx_hash}");

        assert_eq!(reply.status_code(), StatusCode::OK);
        assert_eq!(
            reply.body().msg,
            "After retry 2 times, status are still PENDING, please check via /transactions/{tx_hash}"
        );
        assert_eq!(reply.body().tx_hash.as_deref(), Some("abc123"));
        assert_eq!(reply.body().tx_status, None);
    }

    #[test]
    fn test_terminal_body_shape() {
        let outcome = TrackOutcome::Terminal {
            status: TransactionStatus::Confirmed,
            tx_id: TransactionId::from("abc123"),
        };
        let json = serde_json::to_value(Reply::tracked(&outcome, "/x").body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "msg": "Status checking success",
                "tx_status": "CONFIRMED",
                "tx_hash": "abc123"
            })
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (GatewayError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (GatewayError::Decode("x".into()), StatusCode::BAD_GATEWAY),
            (
                GatewayError::Cancelled(CancelReason::DeadlineElapsed),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                GatewayError::Cancelled(CancelReason::Shutdown),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(Reply::failure(&err, CANNOT_CHECK).status_code(), expected);
        }
    }

    #[test]
    fn test_invalid_request_messages() {
        assert_eq!(
            Reply::invalid(InvalidRequest::TimestampDigits(1)).body().msg,
            TIMESTAMP_INVALID
        );
        assert_eq!(Reply::invalid(InvalidRequest::MissingPrice).body().msg, BODY_INVALID);
    }

    #[test]
    fn test_request_id_is_echoed() {
        let id = RequestId::from_headers(&Default::default(), false).unwrap();
        let response = Reply::status(TransactionStatus::Failed)
            .with_request_id(&id)
            .into_response();
        assert_eq!(
            response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap(),
            id.as_str()
        );
    }
}
