//! Request handling and validation.
//!
//! # Responsibilities
//! - Resolve the caller's `X-Request-ID` (or generate one when allowed)
//! - Bind the broadcast body
//! - Validate fields before any upstream call is made
//!
//! # Design Decisions
//! - Missing body fields bind to zero values and fail validation, not binding
//! - Timestamp must be Unix seconds or milliseconds (10-13 digits)

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::upstream::types::TransactionRequest;

/// Correlation header, lower-case as stored by `http`.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Read the id from `headers`.
    ///
    /// Returns `None` when the header is missing or blank and `required` is set;
    /// otherwise a missing header yields a fresh UUID v4.
    pub fn from_headers(headers: &HeaderMap, required: bool) -> Option<Self> {
        let given = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match given {
            Some(id) => Some(Self(id.to_string())),
            None if required => None,
            None => Some(Self::generate()),
        }
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound broadcast body as sent by callers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastBody {
    pub symbol: String,
    pub price: u64,
    pub timestamp: u64,
}

/// Why an inbound request was rejected before reaching upstream.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("symbol is required")]
    MissingSymbol,

    #[error("price is required")]
    MissingPrice,

    #[error("timestamp is required")]
    MissingTimestamp,

    #[error("timestamp {0} must be between 10 and 13 digits")]
    TimestampDigits(u64),
}

impl BroadcastBody {
    /// Check required fields and the timestamp format.
    pub fn validate(self) -> Result<TransactionRequest, InvalidRequest> {
        if self.symbol.trim().is_empty() {
            return Err(InvalidRequest::MissingSymbol);
        }
        if self.price == 0 {
            return Err(InvalidRequest::MissingPrice);
        }
        if self.timestamp == 0 {
            return Err(InvalidRequest::MissingTimestamp);
        }
        check_unix_timestamp(self.timestamp)?;

        Ok(TransactionRequest {
            symbol: self.symbol,
            price: self.price,
            timestamp: self.timestamp,
        })
    }
}

/// Accept Unix timestamps with 10 to 13 decimal digits.
pub fn check_unix_timestamp(timestamp: u64) -> Result<(), InvalidRequest> {
    let digits = timestamp.checked_ilog10().map_or(1, |log| log + 1);
    if (10..=13).contains(&digits) {
        Ok(())
    } else {
        Err(InvalidRequest::TimestampDigits(timestamp))
    }
}
