//! Core scanning pipeline
//!
//! Leaves first: `rate_limiter`, `symbols`, `fetcher`, `spread`, `notify`,
//! and `scheduler` which drives them.
//!
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{ScanScheduler, SpreadEvaluator, SymbolMatcher};
//! ```

pub mod fetcher;
pub mod notify;
pub mod rate_limiter;
pub mod scheduler;
pub mod spread;
pub mod symbols;
pub mod types;

pub use fetcher::{PriceFetcher, RetryPolicy};
pub use notify::{DeliveryOutcome, DeliveryReport, DeliveryStatus, FanoutConfig, NotificationFanout};
pub use rate_limiter::RateLimiter;
pub use scheduler::{CycleReport, PairOutcome, ScanScheduler, SchedulerConfig, Tier, TierReport};
pub use spread::{SignalAction, SpreadEvaluator, SpreadThresholds};
pub use symbols::{normalize, SymbolKind, SymbolMatcher};
pub use types::{
    ArbitrageSignal, InstrumentPair, MessageLink, PriceObservation, RecipientId, RenderedMessage,
    SignalDirection,
};
