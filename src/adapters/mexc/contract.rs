//! MEXC contract (perpetual futures) REST adapter
//!
//! - `GET /api/v1/contract/ticker?symbol=..`: last price; envelope code 510
//!   means the caller is rate limited
//! - `GET /api/v1/contract/detail`: every listed contract

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::DerivativeMarket;
use crate::config::UpstreamConfig;

use super::http::{build_client, get_json};
use super::types::ContractEnvelope;

const TICKER_PATH: &str = "/api/v1/contract/ticker";
const DETAIL_PATH: &str = "/api/v1/contract/detail";

pub struct MexcContractMarket {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MexcContractMarket {
    pub fn new(api: &UpstreamConfig) -> Self {
        let timeout = api.request_timeout();
        Self {
            client: build_client(timeout),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl DerivativeMarket for MexcContractMarket {
    async fn ticker(&self, symbol: &str) -> ExchangeResult<f64> {
        let url = format!("{}{}?symbol={}", self.base_url, TICKER_PATH, symbol);
        let envelope: ContractEnvelope = get_json(&self.client, &url, self.timeout).await?;
        envelope.ticker_price(symbol)
    }

    async fn list_symbols(&self) -> ExchangeResult<Vec<String>> {
        let url = format!("{}{}", self.base_url, DETAIL_PATH);
        let envelope: ContractEnvelope = get_json(&self.client, &url, self.timeout).await?;
        let symbols = envelope.listed_symbols()?;
        info!(symbols = symbols.len(), "[REFRESH] Contract listing fetched");
        Ok(symbols)
    }

    fn name(&self) -> &'static str {
        "mexc-contract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::errors::ExchangeError;
    use mockito::Matcher;

    fn market(url: &str) -> MexcContractMarket {
        MexcContractMarket::new(&UpstreamConfig::new(url))
    }

    #[tokio::test]
    async fn test_ticker_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/contract/ticker")
            .match_query(Matcher::UrlEncoded("symbol".into(), "BTC_USDT".into()))
            .with_status(200)
            .with_body(r#"{"success":true,"code":0,"data":{"symbol":"BTC_USDT","lastPrice":50250}}"#)
            .create_async()
            .await;

        let price = market(&server.url()).ticker("BTC_USDT").await.unwrap();

        assert_eq!(price, 50250.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ticker_rate_limit_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/contract/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false,"code":510,"message":"Requests are too frequent"}"#)
            .create_async()
            .await;

        let err = market(&server.url()).ticker("BTC_USDT").await.unwrap_err();
        assert!(matches!(err, ExchangeError::RateLimited { code: 510 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_list_symbols() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/contract/detail")
            .with_status(200)
            .with_body(
                r#"{"success":true,"code":0,"data":[
                    {"symbol":"BTC_USDT","baseCoin":"BTC"},
                    {"symbol":"ETH_USDT","baseCoin":"ETH"}
                ]}"#,
            )
            .create_async()
            .await;

        let symbols = market(&server.url()).list_symbols().await.unwrap();

        assert_eq!(symbols, vec!["BTC_USDT", "ETH_USDT"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_symbols_rejects_non_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/contract/detail")
            .with_status(200)
            .with_body(r#"{"success":false,"code":500,"data":null}"#)
            .create_async()
            .await;

        let err = market(&server.url()).list_symbols().await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_symbols_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/contract/detail")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = market(&server.url()).list_symbols().await.unwrap_err();
        assert!(matches!(err, ExchangeError::HttpStatus { status: 503, .. }));
    }
}
