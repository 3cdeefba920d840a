//! Outbound collaborators of the scan pipeline
//!
//! MEXC spot/contract market data, Supabase persistence, Telegram delivery
//! and in-process stand-ins, all behind the traits in `traits`.

pub mod errors;
pub mod memory;
pub mod mexc;
pub mod supabase;
pub mod telegram;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use errors::{DeliveryError, ExchangeError, ExchangeResult, StoreError};
pub use traits::{DerivativeMarket, MessageTransport, SignalStore, SpotMarket, SubscriberRegistry};
pub use types::SpotQuote;
