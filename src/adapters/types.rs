//! Adapter-level value types shared across venues

use serde::{Deserialize, Serialize};

/// Spot ticker snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub price: f64,
    /// 24h quote volume (0 when the venue omits it)
    pub volume: f64,
}

impl SpotQuote {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }
}
