//! Shared REST plumbing for the MEXC adapters

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Build a client whose every request carries `timeout`
pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "[INIT] HTTP client builder failed, using defaults");
            reqwest::Client::new()
        })
}

/// GET `url` and decode a JSON body, mapping HTTP-level failures
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> ExchangeResult<T> {
    let timeout_ms = timeout.as_millis() as u64;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExchangeError::from_request(e, timeout_ms))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ExchangeError::from_request(e, timeout_ms))?;

    if status.as_u16() == HTTP_TOO_MANY_REQUESTS {
        return Err(ExchangeError::RateLimited {
            code: HTTP_TOO_MANY_REQUESTS as i64,
        });
    }

    if !status.is_success() {
        return Err(ExchangeError::HttpStatus {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| ExchangeError::InvalidResponse(format!("Invalid JSON: {} - {}", e, text)))
}
