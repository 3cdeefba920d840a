//! Application-wide constants and tuning defaults
//!
//! Retry knobs can be overridden via environment variables. Wire-format
//! constants (field candidate lists, upstream status codes) are fixed.

use std::time::Duration;

// =============================================================================
// Fetch Retry
// =============================================================================

/// Attempts per ticker fetch before degrading to "no data" (default: 3)
///
/// Environment variable: `FETCH_MAX_ATTEMPTS`
pub fn fetch_max_attempts() -> u32 {
    std::env::var("FETCH_MAX_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &u32| *n > 0)
        .unwrap_or(3)
}

/// Linear backoff step; the wait after attempt `n` is `n * step` (default: 1500ms)
///
/// Environment variable: `FETCH_BACKOFF_STEP_MS`
pub fn fetch_backoff_step() -> Duration {
    let ms = std::env::var("FETCH_BACKOFF_STEP_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1500);
    Duration::from_millis(ms)
}

// =============================================================================
// Upstream Wire Format
// =============================================================================

/// Spot ticker price fields, in preference order
pub const SPOT_PRICE_FIELDS: &[&str] = &["lastPrice", "price"];

/// Spot ticker 24h quote-volume fields, in preference order
pub const SPOT_VOLUME_FIELDS: &[&str] = &["quoteVolume"];

/// Contract listing symbol fields, in preference order
pub const DERIVATIVE_SYMBOL_FIELDS: &[&str] = &["symbol", "contractName", "instrumentId"];

/// Contract API envelope code meaning "too many requests"
pub const DERIVATIVE_RATE_LIMIT_CODE: i64 = 510;

// =============================================================================
// Helper Functions
// =============================================================================

/// Print tuning values (for startup logs)
pub fn log_configuration() {
    tracing::info!("=== Scanner Tuning ===");
    tracing::info!("Fetch:");
    tracing::info!("  - Max attempts: {}", fetch_max_attempts());
    tracing::info!("  - Backoff step: {:?}", fetch_backoff_step());
    tracing::info!("Upstream:");
    tracing::info!("  - Spot price fields: {:?}", SPOT_PRICE_FIELDS);
    tracing::info!("  - Contract rate-limit code: {}", DERIVATIVE_RATE_LIMIT_CODE);
    tracing::info!("======================");
}
