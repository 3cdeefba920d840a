//! Symbol normalisation and spot/derivative pair matching
//!
//! Spot and contract listings spell the same asset differently
//! ("BTCUSDT" vs "BTC_USDT"). Both are reduced to a canonical form and
//! matched on equality.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::adapters::traits::{DerivativeMarket, SpotMarket};
use crate::core::types::InstrumentPair;

/// Quote currencies stripped from the end of spot symbols
const SPOT_QUOTE_SUFFIXES: &[&str] = &["USDT", "USD"];

/// Contract qualifiers stripped from the end of derivative symbols
const DERIVATIVE_SUFFIXES: &[&str] = &[
    "_PERP",
    "_USD",
    "_USDT",
    "_FUTURE",
    "_THISWEEK",
    "_NEXTWEEK",
    "_QUARTER",
    "_NEXTQUARTER",
];

/// Over-fetch factor for the spot ranking, covering symbols without a contract
const RANKING_OVERFETCH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Spot,
    Derivative,
}

/// Reduce a symbol to its canonical (uppercase, suffix-free) form.
///
/// Spot: trailing `USDT`/`USD` are stripped until none remain, which makes
/// the operation idempotent. Derivative: the longest matching contract
/// qualifier is stripped once, then every `_` separator is removed.
pub fn normalize(symbol: &str, kind: SymbolKind) -> String {
    let upper = symbol.trim().to_ascii_uppercase();
    match kind {
        SymbolKind::Spot => {
            let mut base = upper.as_str();
            while let Some(stripped) = SPOT_QUOTE_SUFFIXES
                .iter()
                .find_map(|suffix| base.strip_suffix(suffix))
            {
                base = stripped;
            }
            base.to_string()
        }
        SymbolKind::Derivative => {
            let base = DERIVATIVE_SUFFIXES
                .iter()
                .filter(|suffix| upper.ends_with(*suffix))
                .max_by_key(|suffix| suffix.len())
                .map(|suffix| &upper[..upper.len() - suffix.len()])
                .unwrap_or(upper.as_str());
            base.replace('_', "")
        }
    }
}

/// Produces the working set of pairs from the two market listings
pub struct SymbolMatcher {
    spot: Arc<dyn SpotMarket>,
    derivative: Arc<dyn DerivativeMarket>,
    deny_substrings: Vec<String>,
}

impl SymbolMatcher {
    pub fn new(
        spot: Arc<dyn SpotMarket>,
        derivative: Arc<dyn DerivativeMarket>,
        deny_substrings: Vec<String>,
    ) -> Self {
        Self {
            spot,
            derivative,
            deny_substrings: deny_substrings
                .into_iter()
                .map(|s| s.to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    fn is_denied(&self, spot_symbol: &str) -> bool {
        let upper = spot_symbol.to_ascii_uppercase();
        self.deny_substrings.iter().any(|d| upper.contains(d.as_str()))
    }

    /// Build up to `limit` pairs, preserving the spot volume ranking.
    ///
    /// Upstream failures yield an empty list; the caller retries on its
    /// next refresh.
    pub async fn build_pairs(&self, limit: usize) -> Vec<InstrumentPair> {
        if limit == 0 {
            return Vec::new();
        }

        let derivative_symbols = match self.derivative.list_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(
                    venue = self.derivative.name(),
                    error = %e,
                    "[REFRESH] Derivative listing failed"
                );
                return Vec::new();
            }
        };
        if derivative_symbols.is_empty() {
            warn!(venue = self.derivative.name(), "[REFRESH] Derivative listing is empty");
            return Vec::new();
        }

        let ranked = match self
            .spot
            .top_symbols_by_volume(limit.saturating_mul(RANKING_OVERFETCH))
            .await
        {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(venue = self.spot.name(), error = %e, "[REFRESH] Spot ranking failed");
                return Vec::new();
            }
        };

        // Later duplicates overwrite earlier ones
        let mut by_canonical: HashMap<String, String> = HashMap::with_capacity(derivative_symbols.len());
        for symbol in derivative_symbols {
            let canonical = normalize(&symbol, SymbolKind::Derivative);
            if canonical.is_empty() {
                continue;
            }
            by_canonical.insert(canonical, symbol);
        }

        let mut pairs = Vec::with_capacity(limit);
        for spot_symbol in ranked {
            if self.is_denied(&spot_symbol) {
                debug!(symbol = %spot_symbol, "[REFRESH] Skipping denied symbol");
                continue;
            }
            let canonical = normalize(&spot_symbol, SymbolKind::Spot);
            if let Some(derivative_symbol) = by_canonical.get(&canonical) {
                pairs.push(InstrumentPair::new(spot_symbol, derivative_symbol.clone()));
                if pairs.len() >= limit {
                    break;
                }
            }
        }

        info!(pairs = pairs.len(), limit, "[REFRESH] Pairs selected for scanning");
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::errors::ExchangeError;
    use crate::adapters::test_utils::{MockDerivativeMarket, MockSpotMarket};
    use proptest::prelude::*;

    fn matcher(spot: MockSpotMarket, derivative: MockDerivativeMarket) -> SymbolMatcher {
        SymbolMatcher::new(Arc::new(spot), Arc::new(derivative), vec!["TRUMP".to_string()])
    }

    #[test]
    fn test_normalize_spot() {
        assert_eq!(normalize("BTCUSDT", SymbolKind::Spot), "BTC");
        assert_eq!(normalize("ethusd", SymbolKind::Spot), "ETH");
        assert_eq!(normalize("SOLBTC", SymbolKind::Spot), "SOLBTC");
        assert_eq!(normalize("USDCUSDT", SymbolKind::Spot), "USDC");
    }

    #[test]
    fn test_normalize_derivative() {
        assert_eq!(normalize("BTC_USDT", SymbolKind::Derivative), "BTC");
        assert_eq!(normalize("BTC_USD", SymbolKind::Derivative), "BTC");
        assert_eq!(normalize("ETH_PERP", SymbolKind::Derivative), "ETH");
        assert_eq!(normalize("XRP_NEXTQUARTER", SymbolKind::Derivative), "XRP");
        assert_eq!(normalize("1000_PEPE_USDT", SymbolKind::Derivative), "1000PEPE");
        assert_eq!(normalize("btc_usdt", SymbolKind::Derivative), "BTC");
    }

    #[test]
    fn test_spot_and_derivative_canonical_forms_match() {
        assert_eq!(
            normalize("DOGEUSDT", SymbolKind::Spot),
            normalize("DOGE_USDT", SymbolKind::Derivative)
        );
    }

    proptest! {
        #[test]
        fn prop_spot_normalize_is_idempotent(s in "[A-Za-z0-9]{0,12}(USD|USDT)?(USD|USDT)?") {
            let once = normalize(&s, SymbolKind::Spot);
            let twice = normalize(&once, SymbolKind::Spot);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_spot_normalize_only_strips_suffixes(base in "[A-Z]{1,8}[0-9A-CE-SV-Z]") {
            // bases not ending in a quote suffix survive intact
            prop_assume!(!base.ends_with("USD") && !base.ends_with("USDT"));
            let with_quote = format!("{}USDT", base);
            prop_assert_eq!(normalize(&with_quote, SymbolKind::Spot), base);
        }
    }

    #[tokio::test]
    async fn test_build_pairs_preserves_ranking_order() {
        let spot = MockSpotMarket::new().with_ranking(&["AUSDT", "BUSDT", "CUSDT"]);
        let derivative = MockDerivativeMarket::new().with_listing(&["C_USDT", "A_USDT"]);

        let pairs = matcher(spot, derivative).build_pairs(10).await;
        assert_eq!(
            pairs,
            vec![
                InstrumentPair::new("AUSDT", "A_USDT"),
                InstrumentPair::new("CUSDT", "C_USDT"),
            ]
        );
    }

    #[tokio::test]
    async fn test_build_pairs_stops_at_limit() {
        let spot = MockSpotMarket::new().with_ranking(&["AUSDT", "BUSDT", "CUSDT"]);
        let derivative = MockDerivativeMarket::new().with_listing(&["A_USDT", "B_USDT", "C_USDT"]);

        let pairs = matcher(spot, derivative).build_pairs(2).await;
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].spot_symbol, "BUSDT");
    }

    #[tokio::test]
    async fn test_build_pairs_overfetches_ranking() {
        let spot = MockSpotMarket::new().with_ranking(&["AUSDT"]);
        let derivative = MockDerivativeMarket::new().with_listing(&["A_USDT"]);
        let spot = Arc::new(spot);

        let matcher = SymbolMatcher::new(spot.clone(), Arc::new(derivative), Vec::new());
        matcher.build_pairs(7).await;
        assert_eq!(spot.last_ranking_limit(), Some(21));
    }

    #[tokio::test]
    async fn test_build_pairs_excludes_denied_symbols() {
        let spot = MockSpotMarket::new().with_ranking(&["TRUMPUSDT", "BTCUSDT"]);
        let derivative = MockDerivativeMarket::new().with_listing(&["TRUMP_USDT", "BTC_USDT"]);

        let pairs = matcher(spot, derivative).build_pairs(10).await;
        assert_eq!(pairs, vec![InstrumentPair::new("BTCUSDT", "BTC_USDT")]);
    }

    #[tokio::test]
    async fn test_build_pairs_listing_failure_returns_empty() {
        let spot = MockSpotMarket::new().with_ranking(&["BTCUSDT"]);
        let derivative = MockDerivativeMarket::new()
            .with_listing_error(ExchangeError::InvalidResponse("data is not a list".into()));

        let pairs = matcher(spot, derivative).build_pairs(10).await;
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn test_build_pairs_ranking_failure_returns_empty() {
        let spot = MockSpotMarket::new()
            .with_ranking_error(ExchangeError::HttpStatus { status: 503, body: String::new() });
        let derivative = MockDerivativeMarket::new().with_listing(&["BTC_USDT"]);

        let pairs = matcher(spot, derivative).build_pairs(10).await;
        assert!(pairs.is_empty());
    }
}
