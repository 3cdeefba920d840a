//! Rate-limited ticker fetching with bounded retry
//!
//! Every attempt goes through the upstream's shared `RateLimiter`. The
//! permit is released before the backoff sleep. After the last failed
//! attempt the fetcher degrades to the zero "no data" sentinel instead of
//! returning an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::{DerivativeMarket, SpotMarket};
use crate::config::constants;
use crate::core::rate_limiter::RateLimiter;
use crate::core::types::PriceObservation;

/// Linear backoff: the wait after failed attempt `n` (1-based) is `n * backoff_step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// Policy from `FETCH_MAX_ATTEMPTS` / `FETCH_BACKOFF_STEP_MS`
    pub fn from_env() -> Self {
        Self::new(constants::fetch_max_attempts(), constants::fetch_backoff_step())
    }

    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1500))
    }
}

pub struct PriceFetcher {
    spot: Arc<dyn SpotMarket>,
    derivative: Arc<dyn DerivativeMarket>,
    spot_limiter: Arc<RateLimiter>,
    derivative_limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl PriceFetcher {
    pub fn new(
        spot: Arc<dyn SpotMarket>,
        derivative: Arc<dyn DerivativeMarket>,
        spot_limiter: Arc<RateLimiter>,
        derivative_limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            spot,
            derivative,
            spot_limiter,
            derivative_limiter,
            policy,
        }
    }

    /// Spot price and 24h quote volume; `(0, 0)` once every attempt failed
    pub async fn fetch_spot(&self, symbol: &str) -> PriceObservation {
        let spot = &self.spot;
        let result = with_retry(&self.spot_limiter, self.policy, symbol, || async move {
            spot.ticker(symbol).await
        })
        .await;

        match result {
            Some(quote) => PriceObservation::new(symbol, quote.price, quote.volume),
            None => PriceObservation::unavailable(symbol),
        }
    }

    /// Derivative price; `0` once every attempt failed
    pub async fn fetch_derivative(&self, symbol: &str) -> PriceObservation {
        let derivative = &self.derivative;
        let result = with_retry(&self.derivative_limiter, self.policy, symbol, || async move {
            derivative.ticker(symbol).await
        })
        .await;

        match result {
            Some(price) => PriceObservation::new(symbol, price, 0.0),
            None => PriceObservation::unavailable(symbol),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, one limiter permit per attempt.
async fn with_retry<T, F, Fut>(
    limiter: &RateLimiter,
    policy: RetryPolicy,
    symbol: &str,
    mut op: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ExchangeResult<T>>,
{
    for attempt in 1..=policy.max_attempts {
        let outcome = match limiter.acquire().await {
            Ok(_permit) => op().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        limiter = limiter.name(),
                        symbol = %symbol,
                        attempt,
                        "Fetch succeeded after retry"
                    );
                }
                return Some(value);
            }
            Err(e) if !e.is_retryable() => {
                error!(limiter = limiter.name(), symbol = %symbol, error = %e, "Fetch aborted");
                return None;
            }
            Err(e) if attempt < policy.max_attempts => {
                let wait = policy.backoff_after(attempt);
                warn!(
                    limiter = limiter.name(),
                    symbol = %symbol,
                    attempt,
                    error = %e,
                    retry_in_ms = wait.as_millis() as u64,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => {
                error!(
                    limiter = limiter.name(),
                    symbol = %symbol,
                    attempts = policy.max_attempts,
                    error = %e,
                    "Fetch failed, giving up"
                );
            }
        }
    }

    debug!(symbol = %symbol, "Returning no-data sentinel");
    None
}
