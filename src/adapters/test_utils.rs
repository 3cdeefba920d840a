//! Shared test utilities for adapter and pipeline testing
//!
//! Scriptable in-process collaborators: markets whose ticker answers are
//! queued per symbol, and a transport that records every send.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::adapters::errors::{DeliveryError, ExchangeError, ExchangeResult, StoreError};
use crate::adapters::traits::{
    DerivativeMarket, MessageTransport, SignalStore, SpotMarket, SubscriberRegistry,
};
use crate::adapters::types::SpotQuote;
use crate::core::types::{ArbitrageSignal, RecipientId, RenderedMessage};

/// Per-symbol answer queue. The last queued answer repeats once the queue
/// is down to one entry.
struct Script<T> {
    answers: HashMap<String, VecDeque<ExchangeResult<T>>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self { answers: HashMap::new() }
    }

    fn push(&mut self, symbol: &str, answer: ExchangeResult<T>) {
        self.answers.entry(symbol.to_string()).or_default().push_back(answer);
    }

    fn next(&mut self, symbol: &str) -> ExchangeResult<T> {
        let Some(queue) = self.answers.get_mut(symbol) else {
            return Err(ExchangeError::InvalidResponse(format!("no script for {}", symbol)));
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Err(ExchangeError::LimiterClosed))
        } else {
            match queue.front() {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(clone_error(e)),
                None => Err(ExchangeError::InvalidResponse(format!("no script for {}", symbol))),
            }
        }
    }
}

fn clone_error(e: &ExchangeError) -> ExchangeError {
    match e {
        ExchangeError::NetworkTimeout(ms) => ExchangeError::NetworkTimeout(*ms),
        ExchangeError::HttpStatus { status, body } => ExchangeError::HttpStatus {
            status: *status,
            body: body.clone(),
        },
        ExchangeError::RateLimited { code } => ExchangeError::RateLimited { code: *code },
        ExchangeError::MissingField { symbol, candidates } => ExchangeError::MissingField {
            symbol: symbol.clone(),
            candidates: *candidates,
        },
        ExchangeError::LimiterClosed => ExchangeError::LimiterClosed,
        other => ExchangeError::InvalidResponse(other.to_string()),
    }
}

// =============================================================================
// Markets
// =============================================================================

pub struct MockSpotMarket {
    tickers: Mutex<Script<SpotQuote>>,
    ranking: Mutex<Option<ExchangeResult<Vec<String>>>>,
    last_ranking_limit: Mutex<Option<usize>>,
    pub ticker_calls: AtomicUsize,
}

impl MockSpotMarket {
    pub fn new() -> Self {
        Self {
            tickers: Mutex::new(Script::new()),
            ranking: Mutex::new(Some(Ok(Vec::new()))),
            last_ranking_limit: Mutex::new(None),
            ticker_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_ranking(self, symbols: &[&str]) -> Self {
        *self.ranking.lock().unwrap() = Some(Ok(symbols.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn with_ranking_error(self, err: ExchangeError) -> Self {
        *self.ranking.lock().unwrap() = Some(Err(err));
        self
    }

    pub fn with_ticker(self, symbol: &str, price: f64, volume: f64) -> Self {
        self.tickers.lock().unwrap().push(symbol, Ok(SpotQuote::new(price, volume)));
        self
    }

    pub fn with_ticker_error(self, symbol: &str, err: ExchangeError) -> Self {
        self.tickers.lock().unwrap().push(symbol, Err(err));
        self
    }

    pub fn last_ranking_limit(&self) -> Option<usize> {
        *self.last_ranking_limit.lock().unwrap()
    }

    pub fn ticker_call_count(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSpotMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpotMarket for MockSpotMarket {
    async fn ticker(&self, symbol: &str) -> ExchangeResult<SpotQuote> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.tickers.lock().unwrap().next(symbol)
    }

    async fn top_symbols_by_volume(&self, limit: usize) -> ExchangeResult<Vec<String>> {
        *self.last_ranking_limit.lock().unwrap() = Some(limit);
        match self.ranking.lock().unwrap().as_ref() {
            Some(Ok(symbols)) => Ok(symbols.iter().take(limit).cloned().collect()),
            Some(Err(e)) => Err(clone_error(e)),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "mock-spot"
    }
}

pub struct MockDerivativeMarket {
    tickers: Mutex<Script<f64>>,
    listing: Mutex<ExchangeResult<Vec<String>>>,
    pub ticker_calls: AtomicUsize,
    pub listing_calls: AtomicUsize,
}

impl MockDerivativeMarket {
    pub fn new() -> Self {
        Self {
            tickers: Mutex::new(Script::new()),
            listing: Mutex::new(Ok(Vec::new())),
            ticker_calls: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_listing(self, symbols: &[&str]) -> Self {
        *self.listing.lock().unwrap() = Ok(symbols.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_listing_error(self, err: ExchangeError) -> Self {
        *self.listing.lock().unwrap() = Err(err);
        self
    }

    pub fn with_ticker(self, symbol: &str, price: f64) -> Self {
        self.tickers.lock().unwrap().push(symbol, Ok(price));
        self
    }

    pub fn with_ticker_error(self, symbol: &str, err: ExchangeError) -> Self {
        self.tickers.lock().unwrap().push(symbol, Err(err));
        self
    }

    pub fn ticker_call_count(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }

    pub fn listing_call_count(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDerivativeMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DerivativeMarket for MockDerivativeMarket {
    async fn ticker(&self, symbol: &str) -> ExchangeResult<f64> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.tickers.lock().unwrap().next(symbol)
    }

    async fn list_symbols(&self) -> ExchangeResult<Vec<String>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        match &*self.listing.lock().unwrap() {
            Ok(symbols) => Ok(symbols.clone()),
            Err(e) => Err(clone_error(e)),
        }
    }

    fn name(&self) -> &'static str {
        "mock-derivative"
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Records sends; recipients can be scripted to fail or time out
pub struct MockTransport {
    pub sent: Mutex<Vec<(RecipientId, String)>>,
    attempts: Mutex<HashMap<RecipientId, usize>>,
    failing: HashSet<RecipientId>,
    timing_out: HashSet<RecipientId>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            timing_out: HashSet::new(),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, recipient: RecipientId) -> Self {
        self.failing.insert(recipient);
        self
    }

    pub fn timing_out_for(mut self, recipient: RecipientId) -> Self {
        self.timing_out.insert(recipient);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn attempts_for(&self, recipient: RecipientId) -> usize {
        self.attempts.lock().unwrap().get(&recipient).copied().unwrap_or(0)
    }

    pub fn delivered(&self) -> Vec<RecipientId> {
        self.sent.lock().unwrap().iter().map(|(r, _)| *r).collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send(&self, recipient: RecipientId, message: &RenderedMessage) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap().entry(recipient).or_insert(0) += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.timing_out.contains(&recipient) {
            return Err(DeliveryError::Timeout);
        }
        if self.failing.contains(&recipient) {
            return Err(DeliveryError::Rejected {
                status: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }

        self.sent.lock().unwrap().push((recipient, message.text.clone()));
        Ok(())
    }
}

// =============================================================================
// Failing Store & Registry
// =============================================================================

/// Store that rejects every save and counts the attempts
#[derive(Default)]
pub struct FailingSignalStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl SignalStore for FailingSignalStore {
    async fn save(&self, _signal: &ArbitrageSignal) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Database("Invalid Supabase credentials".to_string()))
    }
}

/// Registry whose lookups always fail
#[derive(Default)]
pub struct FailingRegistry;

#[async_trait]
impl SubscriberRegistry for FailingRegistry {
    async fn list(&self) -> Result<Vec<RecipientId>, StoreError> {
        Err(StoreError::InvalidData("subscribers table unavailable".to_string()))
    }
}
