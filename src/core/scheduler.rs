//! Tiered scan loop
//!
//! # Cycle
//! 1. Refresh the pair set when it is empty or older than the refresh interval
//! 2. Scan the fast tier (the first `fast_tier_size` pairs), sleep `fast_interval`
//! 3. Scan the slow tier (the rest); sleep `slow_interval` if it had pairs
//!
//! Pairs are scanned one after another; the two legs of a pair are fetched
//! concurrently. Nothing inside a cycle stops the loop: per-pair and
//! per-recipient failures end up in the tier report. Shutdown is checked
//! between pairs and during both sleeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::adapters::telegram::render_message;
use crate::adapters::traits::{SignalStore, SubscriberRegistry};
use crate::config::ScannerConfig;
use crate::core::fetcher::PriceFetcher;
use crate::core::notify::{DeliveryReport, NotificationFanout};
use crate::core::spread::{SignalAction, SpreadEvaluator};
use crate::core::symbols::SymbolMatcher;
use crate::core::types::{ArbitrageSignal, InstrumentPair};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub fast_tier_size: usize,
    pub fast_interval: Duration,
    pub slow_interval: Duration,
    pub pairs_refresh_interval: Duration,
    pub pair_budget: usize,
    pub risk_multiplier: f64,
}

impl From<&ScannerConfig> for SchedulerConfig {
    fn from(scanner: &ScannerConfig) -> Self {
        Self {
            fast_tier_size: scanner.fast_tier_size,
            fast_interval: scanner.fast_interval(),
            slow_interval: scanner.slow_interval(),
            pairs_refresh_interval: scanner.pairs_refresh_interval(),
            pair_budget: scanner.pair_budget,
            risk_multiplier: scanner.risk_multiplier,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Fast,
    Slow,
}

impl Tier {
    fn label(self) -> &'static str {
        match self {
            Tier::Fast => "fast",
            Tier::Slow => "slow",
        }
    }
}

/// What happened to one pair during a tier scan
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// At least one leg came back as the no-data sentinel
    NoData,
    /// Spread below the logging threshold
    Ignored { spread_percent: f64 },
    Persisted { spread_percent: f64, stored: bool },
    Notified {
        spread_percent: f64,
        stored: bool,
        delivery: DeliveryReport,
    },
}

impl PairOutcome {
    pub fn is_signal(&self) -> bool {
        matches!(self, PairOutcome::Persisted { .. } | PairOutcome::Notified { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierReport {
    pub tier: Tier,
    pub outcomes: Vec<(InstrumentPair, PairOutcome)>,
    /// Shutdown arrived before every pair was scanned
    pub interrupted: bool,
}

impl TierReport {
    fn new(tier: Tier) -> Self {
        Self {
            tier,
            outcomes: Vec::new(),
            interrupted: false,
        }
    }

    pub fn scanned(&self) -> usize {
        self.outcomes.len()
    }

    pub fn no_data(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PairOutcome::NoData))
            .count()
    }

    pub fn signals(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_signal()).count()
    }

    pub fn notified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PairOutcome::Notified { .. }))
            .count()
    }

    pub fn outcome_for(&self, spot_symbol: &str) -> Option<&PairOutcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| p.spot_symbol == spot_symbol)
            .map(|(_, o)| o)
    }
}

/// One refresh + fast + slow pass
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub refreshed: bool,
    pub pairs: usize,
    pub fast: TierReport,
    pub slow: TierReport,
}

// =============================================================================
// ScanScheduler
// =============================================================================

pub struct ScanScheduler {
    matcher: SymbolMatcher,
    fetcher: PriceFetcher,
    evaluator: SpreadEvaluator,
    store: Arc<dyn SignalStore>,
    registry: Arc<dyn SubscriberRegistry>,
    fanout: NotificationFanout,
    config: SchedulerConfig,
    pairs: Vec<InstrumentPair>,
    last_refresh: Option<Instant>,
}

impl ScanScheduler {
    pub fn new(
        matcher: SymbolMatcher,
        fetcher: PriceFetcher,
        evaluator: SpreadEvaluator,
        store: Arc<dyn SignalStore>,
        registry: Arc<dyn SubscriberRegistry>,
        fanout: NotificationFanout,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            matcher,
            fetcher,
            evaluator,
            store,
            registry,
            fanout,
            config,
            pairs: Vec::new(),
            last_refresh: None,
        }
    }

    pub fn pairs(&self) -> &[InstrumentPair] {
        &self.pairs
    }

    pub fn tier_pairs(&self, tier: Tier) -> &[InstrumentPair] {
        let split = self.config.fast_tier_size.min(self.pairs.len());
        match tier {
            Tier::Fast => &self.pairs[..split],
            Tier::Slow => &self.pairs[split..],
        }
    }

    fn refresh_due(&self) -> bool {
        match self.last_refresh {
            None => true,
            Some(_) if self.pairs.is_empty() => true,
            Some(at) => at.elapsed() > self.config.pairs_refresh_interval,
        }
    }

    /// Rebuild the pair set if due. Returns whether a refresh ran.
    ///
    /// The refresh time is recorded even when the new set is empty.
    pub async fn refresh_if_due(&mut self) -> bool {
        if !self.refresh_due() {
            return false;
        }

        let pairs = self.matcher.build_pairs(self.config.pair_budget).await;
        let fast = self.config.fast_tier_size.min(pairs.len());
        info!(
            pairs = pairs.len(),
            fast = fast,
            slow = pairs.len() - fast,
            "[REFRESH] Pair set rebuilt"
        );
        if pairs.is_empty() {
            warn!("[REFRESH] No pairs matched, retrying next cycle");
        }

        self.pairs = pairs;
        self.last_refresh = Some(Instant::now());
        true
    }

    /// Fetch, evaluate and route one pair
    pub async fn scan_pair(&self, pair: &InstrumentPair) -> PairOutcome {
        let (spot, derivative) = tokio::join!(
            self.fetcher.fetch_spot(&pair.spot_symbol),
            self.fetcher.fetch_derivative(&pair.derivative_symbol),
        );

        let Some(signal) =
            self.evaluator
                .evaluate(pair, spot.price, spot.volume, derivative.price)
        else {
            warn!(
                pair = %pair,
                spot_price = spot.price,
                derivative_price = derivative.price,
                "[SCAN] Missing price, pair skipped"
            );
            return PairOutcome::NoData;
        };

        let spread_percent = signal.spread_percent;
        match self.evaluator.classify(&signal) {
            SignalAction::Ignore => {
                debug!(
                    pair = %pair,
                    spread = %format!("{:.4}%", spread_percent),
                    "[SCAN] Below threshold"
                );
                PairOutcome::Ignored { spread_percent }
            }
            SignalAction::Persist => {
                let stored = self.persist(&signal).await;
                PairOutcome::Persisted {
                    spread_percent,
                    stored,
                }
            }
            SignalAction::PersistAndNotify => {
                let stored = self.persist(&signal).await;
                let delivery = self.notify(&signal).await;
                PairOutcome::Notified {
                    spread_percent,
                    stored,
                    delivery,
                }
            }
        }
    }

    async fn persist(&self, signal: &ArbitrageSignal) -> bool {
        info!(
            pair = %signal.pair(),
            spot_price = signal.spot_price,
            derivative_price = signal.derivative_price,
            spread = %format!("{:.4}%", signal.spread_percent),
            direction = %signal.direction,
            "[SIGNAL] Spread detected"
        );

        match self.store.save(signal).await {
            Ok(()) => true,
            Err(e) => {
                error!(spot = %signal.spot_symbol, error = %e, "[SIGNAL] Persisting failed");
                false
            }
        }
    }

    async fn notify(&self, signal: &ArbitrageSignal) -> DeliveryReport {
        let recipients = match self.registry.list().await {
            Ok(recipients) => recipients,
            Err(e) => {
                error!(spot = %signal.spot_symbol, error = %e, "[NOTIFY] Subscriber lookup failed");
                return DeliveryReport::default();
            }
        };

        let message = render_message(signal, self.config.risk_multiplier);
        self.fanout.notify(signal, &message, &recipients).await
    }

    /// Scan every pair of `tier` in order.
    ///
    /// With a shutdown receiver, a pending signal (or a closed channel)
    /// stops the scan before the next pair.
    pub async fn scan_tier(
        &self,
        tier: Tier,
        mut shutdown: Option<&mut broadcast::Receiver<()>>,
    ) -> TierReport {
        let mut report = TierReport::new(tier);
        let pairs = self.tier_pairs(tier);
        if pairs.is_empty() {
            return report;
        }

        let started = Instant::now();
        for pair in pairs {
            if let Some(rx) = shutdown.as_deref_mut() {
                if !matches!(rx.try_recv(), Err(TryRecvError::Empty)) {
                    info!(tier = tier.label(), "[SHUTDOWN] Tier scan interrupted");
                    report.interrupted = true;
                    break;
                }
            }
            let outcome = self.scan_pair(pair).await;
            report.outcomes.push((pair.clone(), outcome));
        }

        info!(
            tier = tier.label(),
            scanned = report.scanned(),
            signals = report.signals(),
            no_data = report.no_data(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[SCAN] Tier complete"
        );
        report
    }

    /// One full cycle without sleeping or shutdown checks
    pub async fn run_once(&mut self) -> CycleReport {
        let refreshed = self.refresh_if_due().await;
        let fast = self.scan_tier(Tier::Fast, None).await;
        let slow = self.scan_tier(Tier::Slow, None).await;
        CycleReport {
            refreshed,
            pairs: self.pairs.len(),
            fast,
            slow,
        }
    }

    /// Run until a shutdown signal arrives (or its sender is dropped)
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            fast_tier_size = self.config.fast_tier_size,
            fast_interval_s = self.config.fast_interval.as_secs(),
            slow_interval_s = self.config.slow_interval.as_secs(),
            pair_budget = self.config.pair_budget,
            "[SCAN] Scheduler started"
        );

        loop {
            self.refresh_if_due().await;

            let fast = self.scan_tier(Tier::Fast, Some(&mut shutdown)).await;
            if fast.interrupted || !sleep_or_shutdown(self.config.fast_interval, &mut shutdown).await {
                break;
            }

            let slow = self.scan_tier(Tier::Slow, Some(&mut shutdown)).await;
            if slow.interrupted {
                break;
            }
            if slow.scanned() > 0
                && !sleep_or_shutdown(self.config.slow_interval, &mut shutdown).await
            {
                break;
            }
        }

        info!("[SHUTDOWN] Scheduler stopped");
    }
}

/// Sleep for `duration`; `false` if shutdown arrived first
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        _ = shutdown.recv() => {
            info!("[SHUTDOWN] Shutdown signal received");
            false
        }
        _ = tokio::time::sleep(duration) => true,
    }
}
