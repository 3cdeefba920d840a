//! MEXC spot REST adapter
//!
//! - `GET /api/v3/ticker/24hr?symbol=..`: price and 24h quote volume
//! - `GET /api/v3/ticker/24hr`: every ticker, used for the volume ranking
//!
//! The ranking keeps the full sorted list for `cache_ttl`, so a request for
//! more symbols after a smaller one is still served correctly.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::SpotMarket;
use crate::adapters::types::SpotQuote;
use crate::config::{RankingConfig, UpstreamConfig};

use super::http::{build_client, get_json};
use super::types::SpotTicker;

const TICKER_PATH: &str = "/api/v3/ticker/24hr";

struct RankingCache {
    fetched_at: Instant,
    symbols: Vec<String>,
}

pub struct MexcSpotMarket {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    quote_suffix: String,
    cache_ttl: Duration,
    ranking: Mutex<Option<RankingCache>>,
}

impl MexcSpotMarket {
    pub fn new(api: &UpstreamConfig, ranking: &RankingConfig) -> Self {
        let timeout = api.request_timeout();
        Self {
            client: build_client(timeout),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout,
            quote_suffix: ranking.quote_suffix.to_ascii_uppercase(),
            cache_ttl: ranking.cache_ttl(),
            ranking: Mutex::new(None),
        }
    }

    async fn fetch_ranking(&self) -> ExchangeResult<Vec<String>> {
        let url = format!("{}{}", self.base_url, TICKER_PATH);
        let tickers: Vec<SpotTicker> = get_json(&self.client, &url, self.timeout).await?;

        let mut ranked: Vec<(String, f64)> = tickers
            .into_iter()
            .filter_map(|t| {
                let volume = t.volume().unwrap_or(0.0);
                let symbol = t.symbol?;
                symbol
                    .to_ascii_uppercase()
                    .ends_with(&self.quote_suffix)
                    .then_some((symbol, volume))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        info!(
            symbols = ranked.len(),
            quote = %self.quote_suffix,
            "[REFRESH] Spot volume ranking fetched"
        );
        Ok(ranked.into_iter().map(|(symbol, _)| symbol).collect())
    }
}

#[async_trait]
impl SpotMarket for MexcSpotMarket {
    async fn ticker(&self, symbol: &str) -> ExchangeResult<SpotQuote> {
        let url = format!("{}{}?symbol={}", self.base_url, TICKER_PATH, symbol);
        let ticker: SpotTicker = get_json(&self.client, &url, self.timeout).await?;

        let price = ticker.price(symbol)?;
        let volume = ticker.volume().unwrap_or_else(|| {
            debug!(symbol = %symbol, "Spot ticker has no volume, using 0");
            0.0
        });

        Ok(SpotQuote::new(price, volume))
    }

    async fn top_symbols_by_volume(&self, limit: usize) -> ExchangeResult<Vec<String>> {
        let mut cache = self.ranking.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.cache_ttl && !cached.symbols.is_empty() {
                debug!(limit, "Spot ranking served from cache");
                return Ok(cached.symbols.iter().take(limit).cloned().collect());
            }
        }

        let symbols = self.fetch_ranking().await?;
        let top = symbols.iter().take(limit).cloned().collect();
        *cache = Some(RankingCache {
            fetched_at: Instant::now(),
            symbols,
        });
        Ok(top)
    }

    fn name(&self) -> &'static str {
        "mexc-spot"
    }
}
