//! Spot/derivative spread evaluation
//!
//! # Architecture
//! - `SpreadEvaluator`: turns two prices into an `ArbitrageSignal` and
//!   classifies it against the logging/notify thresholds
//! - Presentation helpers (strength, liquidity, risk suggestions): pure
//!   lookups over fixed breakpoints, used by the alert formatter

use chrono::Utc;

use crate::core::types::{ArbitrageSignal, InstrumentPair, SignalDirection};

/// Leverage suggestions never exceed this
pub const MAX_SUGGESTED_LEVERAGE: u32 = 20;

/// Position-size suggestion cap, in quote currency
pub const MAX_SUGGESTED_POSITION: f64 = 10_000.0;

/// Share of the spread assumed to survive trading fees
pub const NET_RETURN_FACTOR: f64 = 0.8;

// =============================================================================
// Thresholds
// =============================================================================

/// What the scan loop does with a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Below the logging threshold
    Ignore,
    Persist,
    PersistAndNotify,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadThresholds {
    /// Spread percent at or above which a signal is persisted
    pub logging: f64,
    /// Spread percent at or above which a signal is also fanned out
    pub notify: f64,
}

impl SpreadThresholds {
    pub fn new(logging: f64, notify: f64) -> Self {
        Self { logging, notify }
    }
}

impl Default for SpreadThresholds {
    fn default() -> Self {
        Self {
            logging: 1.5,
            notify: 2.0,
        }
    }
}

// =============================================================================
// SpreadEvaluator
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SpreadEvaluator {
    thresholds: SpreadThresholds,
}

impl SpreadEvaluator {
    pub fn new(thresholds: SpreadThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> SpreadThresholds {
        self.thresholds
    }

    /// Build a signal from one pair's prices.
    ///
    /// Returns `None` if either price is not strictly positive (the fetcher's
    /// zero sentinel included). Equal prices yield `SpotHigher` with spread 0.
    #[must_use]
    pub fn evaluate(
        &self,
        pair: &InstrumentPair,
        spot_price: f64,
        volume: f64,
        derivative_price: f64,
    ) -> Option<ArbitrageSignal> {
        // written as negations so NaN is rejected too
        if !(spot_price > 0.0) || !(derivative_price > 0.0) {
            return None;
        }

        let spread_percent = spread_percent(spot_price, derivative_price);
        let direction = if derivative_price > spot_price {
            SignalDirection::DerivativeHigher
        } else {
            SignalDirection::SpotHigher
        };

        Some(ArbitrageSignal {
            spot_symbol: pair.spot_symbol.clone(),
            derivative_symbol: pair.derivative_symbol.clone(),
            spot_price,
            derivative_price,
            spread_percent,
            volume: volume.max(0.0),
            direction,
            observed_at: Utc::now(),
        })
    }

    /// Route a signal: thresholds are inclusive
    pub fn classify(&self, signal: &ArbitrageSignal) -> SignalAction {
        let spread = signal.spread_percent;
        if spread >= self.thresholds.logging && spread >= self.thresholds.notify {
            SignalAction::PersistAndNotify
        } else if spread >= self.thresholds.logging {
            SignalAction::Persist
        } else {
            SignalAction::Ignore
        }
    }
}

/// `|derivative - spot| / spot * 100`
#[inline]
pub fn spread_percent(spot_price: f64, derivative_price: f64) -> f64 {
    ((derivative_price - spot_price) / spot_price).abs() * 100.0
}

// =============================================================================
// Presentation Helpers
// =============================================================================

#[inline]
pub fn signal_strength(spread_percent: f64) -> &'static str {
    if spread_percent >= 8.0 {
        "very strong"
    } else if spread_percent >= 5.0 {
        "strong"
    } else if spread_percent >= 3.0 {
        "medium"
    } else {
        "moderate"
    }
}

#[inline]
pub fn liquidity_tier(volume: f64) -> &'static str {
    if volume > 5_000_000.0 {
        "high"
    } else if volume > 1_000_000.0 {
        "medium"
    } else {
        "low"
    }
}

#[inline]
pub fn historical_context(spread_percent: f64) -> &'static str {
    if spread_percent >= 15.0 {
        "all-time high"
    } else if spread_percent >= 10.0 {
        "exceptional spread"
    } else if spread_percent >= 5.0 {
        "high opportunity"
    } else {
        "standard arbitrage setup"
    }
}

/// `min(floor(spread * risk_multiplier), 20)`
#[inline]
pub fn suggested_leverage(spread_percent: f64, risk_multiplier: f64) -> u32 {
    let raw = (spread_percent * risk_multiplier).floor();
    if !(raw > 0.0) {
        return 0;
    }
    (raw.min(MAX_SUGGESTED_LEVERAGE as f64)) as u32
}

/// `min(volume * 0.0001, 10000)`
#[inline]
pub fn suggested_position_size(volume: f64) -> f64 {
    (volume * 0.0001).min(MAX_SUGGESTED_POSITION)
}

/// `max(1, spread / 2)` percent from entry
#[inline]
pub fn suggested_stop_loss(spread_percent: f64) -> f64 {
    (spread_percent / 2.0).max(1.0)
}

#[inline]
pub fn estimated_net_return(spread_percent: f64) -> f64 {
    spread_percent * NET_RETURN_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair() -> InstrumentPair {
        InstrumentPair::new("BTCUSDT", "BTC_USDT")
    }

    fn evaluator() -> SpreadEvaluator {
        SpreadEvaluator::new(SpreadThresholds::new(1.5, 2.0))
    }

    #[test]
    fn test_small_spread_is_ignored() {
        let signal = evaluator().evaluate(&pair(), 50000.0, 1.0, 50250.0).unwrap();
        assert!((signal.spread_percent - 0.5).abs() < 1e-9);
        assert_eq!(evaluator().classify(&signal), SignalAction::Ignore);
    }

    #[test]
    fn test_large_spread_is_notified() {
        let signal = evaluator().evaluate(&pair(), 100.0, 1.0, 108.0).unwrap();
        assert!((signal.spread_percent - 8.0).abs() < 1e-9);
        assert_eq!(signal.direction, SignalDirection::DerivativeHigher);
        assert_eq!(evaluator().classify(&signal), SignalAction::PersistAndNotify);
    }

    #[test]
    fn test_between_thresholds_is_persisted_only() {
        let signal = evaluator().evaluate(&pair(), 100.0, 1.0, 98.25).unwrap();
        assert_eq!(signal.direction, SignalDirection::SpotHigher);
        assert_eq!(evaluator().classify(&signal), SignalAction::Persist);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let eval = SpreadEvaluator::new(SpreadThresholds::new(25.0, 50.0));
        let at_logging = eval.evaluate(&pair(), 4.0, 0.0, 5.0).unwrap();
        let at_notify = eval.evaluate(&pair(), 4.0, 0.0, 6.0).unwrap();
        assert_eq!(eval.classify(&at_logging), SignalAction::Persist);
        assert_eq!(eval.classify(&at_notify), SignalAction::PersistAndNotify);
    }

    #[test]
    fn test_non_positive_prices_suppress_signal() {
        assert!(evaluator().evaluate(&pair(), 0.0, 1.0, 100.0).is_none());
        assert!(evaluator().evaluate(&pair(), 100.0, 1.0, 0.0).is_none());
        assert!(evaluator().evaluate(&pair(), -1.0, 1.0, 100.0).is_none());
        assert!(evaluator().evaluate(&pair(), f64::NAN, 1.0, 100.0).is_none());
    }

    #[test]
    fn test_equal_prices_are_spot_higher() {
        let signal = evaluator().evaluate(&pair(), 10.0, 1.0, 10.0).unwrap();
        assert_eq!(signal.spread_percent, 0.0);
        assert_eq!(signal.direction, SignalDirection::SpotHigher);
    }

    #[test]
    fn test_signal_strength_breakpoints() {
        assert_eq!(signal_strength(8.0), "very strong");
        assert_eq!(signal_strength(7.99), "strong");
        assert_eq!(signal_strength(5.0), "strong");
        assert_eq!(signal_strength(3.0), "medium");
        assert_eq!(signal_strength(2.99), "moderate");
    }

    #[test]
    fn test_liquidity_breakpoints() {
        assert_eq!(liquidity_tier(5_000_001.0), "high");
        assert_eq!(liquidity_tier(5_000_000.0), "medium");
        assert_eq!(liquidity_tier(1_000_001.0), "medium");
        assert_eq!(liquidity_tier(1_000_000.0), "low");
    }

    #[test]
    fn test_historical_context_breakpoints() {
        assert_eq!(historical_context(15.0), "all-time high");
        assert_eq!(historical_context(10.0), "exceptional spread");
        assert_eq!(historical_context(5.0), "high opportunity");
        assert_eq!(historical_context(4.9), "standard arbitrage setup");
    }

    #[test]
    fn test_risk_suggestions() {
        assert_eq!(suggested_leverage(2.5, 3.0), 7);
        assert_eq!(suggested_leverage(8.0, 3.0), 20);
        assert_eq!(suggested_leverage(0.1, 3.0), 0);
        assert_eq!(suggested_stop_loss(1.5), 1.0);
        assert_eq!(suggested_stop_loss(8.0), 4.0);
        assert!((suggested_position_size(2_000_000.0) - 200.0).abs() < 1e-9);
        assert_eq!(suggested_position_size(500_000_000.0), 10_000.0);
        assert!((estimated_net_return(8.0) - 6.4).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_spread_formula_and_direction(
            spot in 0.0001f64..1_000_000.0,
            derivative in 0.0001f64..1_000_000.0,
        ) {
            let signal = evaluator().evaluate(&pair(), spot, 0.0, derivative).unwrap();
            let expected = (derivative - spot).abs() / spot * 100.0;
            prop_assert!((signal.spread_percent - expected).abs() <= expected.abs() * 1e-12 + 1e-12);
            prop_assert!(signal.spread_percent >= 0.0);
            if derivative > spot {
                prop_assert_eq!(signal.direction, SignalDirection::DerivativeHigher);
            } else {
                prop_assert_eq!(signal.direction, SignalDirection::SpotHigher);
            }
        }
    }
}
