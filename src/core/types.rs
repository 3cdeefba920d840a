//! Core data types for the scanning pipeline.
//!
//! Pairs are produced by the symbol matcher, observations by the price
//! fetcher and signals by the spread evaluator. All of them are immutable
//! values handed from one stage to the next.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a notification recipient (Telegram chat id)
pub type RecipientId = i64;

// =============================================================================
// Instrument Pair
// =============================================================================

/// One spot symbol matched to the derivative contract on the same asset.
///
/// Replaced wholesale on every pair refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentPair {
    /// Spot symbol (e.g. "BTCUSDT")
    pub spot_symbol: String,
    /// Derivative symbol (e.g. "BTC_USDT")
    pub derivative_symbol: String,
}

impl InstrumentPair {
    pub fn new(spot_symbol: impl Into<String>, derivative_symbol: impl Into<String>) -> Self {
        Self {
            spot_symbol: spot_symbol.into(),
            derivative_symbol: derivative_symbol.into(),
        }
    }
}

impl fmt::Display for InstrumentPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spot_symbol, self.derivative_symbol)
    }
}

// =============================================================================
// Price Observation
// =============================================================================

/// Price (and spot volume) for one instrument at fetch time.
///
/// `price == 0.0` is the "no data" sentinel: the fetcher degrades to it
/// after exhausting its retries. A legitimate zero price is therefore
/// indistinguishable from a failed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub symbol: String,
    pub price: f64,
    /// 24h quote volume, spot leg only (0 for derivatives)
    pub volume: f64,
}

impl PriceObservation {
    pub fn new(symbol: impl Into<String>, price: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
        }
    }

    /// Sentinel observation returned when every attempt failed
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0.0, 0.0)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.price > 0.0
    }
}

// =============================================================================
// Arbitrage Signal
// =============================================================================

/// Which leg quotes the higher price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalDirection {
    /// Spot price >= derivative price
    SpotHigher,
    /// Derivative price > spot price
    DerivativeHigher,
}

impl SignalDirection {
    /// Suggested two-leg trade for this direction
    pub fn strategy(&self) -> &'static str {
        match self {
            SignalDirection::DerivativeHigher => "Buy spot / Sell futures",
            SignalDirection::SpotHigher => "Buy futures / Sell spot",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::SpotHigher => write!(f, "spot higher"),
            SignalDirection::DerivativeHigher => write!(f, "derivative higher"),
        }
    }
}

/// A spot/derivative price discrepancy observed for one pair.
///
/// Invariants (enforced by `SpreadEvaluator::evaluate`):
/// - `spot_price > 0` and `derivative_price > 0`
/// - `spread_percent == |derivative_price - spot_price| / spot_price * 100`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageSignal {
    pub spot_symbol: String,
    pub derivative_symbol: String,
    pub spot_price: f64,
    pub derivative_price: f64,
    pub spread_percent: f64,
    /// 24h spot quote volume
    pub volume: f64,
    pub direction: SignalDirection,
    pub observed_at: DateTime<Utc>,
}

impl ArbitrageSignal {
    pub fn pair(&self) -> InstrumentPair {
        InstrumentPair::new(self.spot_symbol.clone(), self.derivative_symbol.clone())
    }
}

// =============================================================================
// Rendered Message
// =============================================================================

/// One link button attached to an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLink {
    pub label: String,
    pub url: String,
}

impl MessageLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Alert body plus link rows, ready for any transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    /// Rows of link buttons, in display order
    pub links: Vec<Vec<MessageLink>>,
}

impl RenderedMessage {
    /// Text-only message
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            links: Vec::new(),
        }
    }
}
