//! Per-endpoint request pacing
//!
//! Two constraints are enforced together:
//! - at most `max_concurrent` requests in flight (semaphore)
//! - successive grants spaced by at least `1 / requests_per_second`
//!
//! The semaphore permit is taken first, then the pacing lock. The lock is
//! held across the pacing sleep so grants are strictly serialized.

use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::Instant;
use tracing::trace;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Interval used when the configured rate is unusable
const FALLBACK_INTERVAL: Duration = Duration::from_millis(200);

/// Limiter shared by every request to one upstream endpoint family
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    min_interval: Duration,
    slots: Semaphore,
    max_concurrent: usize,
    last_grant: Mutex<Option<Instant>>,
}

/// Proof of admission. Dropping it frees the concurrency slot.
#[derive(Debug)]
pub struct RatePermit<'a> {
    _slot: SemaphorePermit<'a>,
}

impl RateLimiter {
    pub fn new(name: &'static str, requests_per_second: f64, max_concurrent: usize) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            FALLBACK_INTERVAL
        };
        let max_concurrent = max_concurrent.max(1);

        Self {
            name,
            min_interval,
            slots: Semaphore::new(max_concurrent),
            max_concurrent,
            last_grant: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Wait until both the concurrency cap and the pacing interval allow
    /// another request.
    pub async fn acquire(&self) -> ExchangeResult<RatePermit<'_>> {
        let slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| ExchangeError::LimiterClosed)?;

        let mut last = self.last_grant.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(limiter = self.name, wait_ms = wait.as_millis() as u64, "pacing");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
        drop(last);

        Ok(RatePermit { _slot: slot })
    }

    /// Stop granting permits. Pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.slots.close();
    }
}
