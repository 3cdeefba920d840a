//! Outbound collaborator traits
//!
//! The scanning pipeline only talks to these seams. Production impls live
//! in `mexc`, `supabase` and `telegram`; in-memory impls live in `memory`
//! and `test_utils`.

use async_trait::async_trait;

use crate::adapters::errors::{DeliveryError, ExchangeResult, StoreError};
use crate::adapters::types::SpotQuote;
use crate::core::types::{ArbitrageSignal, RecipientId, RenderedMessage};

/// Spot market data source
#[async_trait]
pub trait SpotMarket: Send + Sync {
    /// Latest price and 24h quote volume for one spot symbol
    async fn ticker(&self, symbol: &str) -> ExchangeResult<SpotQuote>;

    /// Up to `limit` spot symbols quoted in the configured currency,
    /// ordered by 24h quote volume descending
    async fn top_symbols_by_volume(&self, limit: usize) -> ExchangeResult<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Derivative (perpetual contract) market data source
#[async_trait]
pub trait DerivativeMarket: Send + Sync {
    /// Latest price for one contract symbol
    async fn ticker(&self, symbol: &str) -> ExchangeResult<f64>;

    /// Every listed contract symbol
    async fn list_symbols(&self) -> ExchangeResult<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Persistence sink for logged signals
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save(&self, signal: &ArbitrageSignal) -> Result<(), StoreError>;
}

/// Source of notification recipients
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    async fn list(&self) -> Result<Vec<RecipientId>, StoreError>;
}

/// Delivers one rendered message to one recipient
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, recipient: RecipientId, message: &RenderedMessage) -> Result<(), DeliveryError>;
}
