//! Adapter error types
//!
//! One enum per outbound collaborator family: market data (`ExchangeError`),
//! signal persistence (`StoreError`) and message delivery (`DeliveryError`).

use thiserror::Error;

/// Market-data errors raised by the spot/derivative adapters
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded its own timeout
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Upstream reported its rate limit (HTTP 429 or an API-level code)
    #[error("Rate limited by upstream (code {code})")]
    RateLimited { code: i64 },

    /// Invalid or unexpected response shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// None of the candidate fields carried a usable value
    #[error("No usable field for {symbol} (tried {candidates:?})")]
    MissingField {
        symbol: String,
        candidates: &'static [&'static str],
    },

    /// Rate limiter can no longer grant permits
    #[error("Rate limiter closed")]
    LimiterClosed,
}

impl ExchangeError {
    /// Transient failures worth another attempt after backoff
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExchangeError::LimiterClosed)
    }

    /// Map a reqwest error, separating timeouts from other transport failures
    pub fn from_request(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ExchangeError::NetworkTimeout(timeout_ms)
        } else {
            ExchangeError::Http(err)
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

/// Errors for signal persistence and subscriber lookups
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend rejected the operation
    #[error("Database error: {0}")]
    Database(String),

    /// Network error during API call
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Payload could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Errors returned by a message transport for one recipient
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport did not answer in time
    #[error("Delivery timed out")]
    Timeout,

    /// Transport answered but refused the message
    #[error("Delivery rejected ({status}): {description}")]
    Rejected { status: u16, description: String },

    /// Any other transport failure
    #[error("Delivery network error: {0}")]
    Network(String),
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Timeout)
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Network(err.to_string())
        }
    }
}
