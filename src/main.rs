//! Spread scanner entry point
//!
//! 1. Loads `.env`, logging and the YAML configuration
//! 2. Builds the MEXC clients, one rate limiter per upstream
//! 3. Picks Supabase or in-memory persistence, Telegram or log-only delivery
//! 4. Runs the scan loop until Ctrl+C

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use spread_scanner::adapters::memory::{
    LogOnlyTransport, MemorySignalStore, StaticSubscriberRegistry, DEFAULT_MEMORY_CAPACITY,
};
use spread_scanner::adapters::mexc::{MexcContractMarket, MexcSpotMarket};
use spread_scanner::adapters::supabase::{SupabaseConfig, SupabaseSignalStore, SupabaseSubscriberRegistry};
use spread_scanner::adapters::telegram::{TelegramConfig, TelegramTransport};
use spread_scanner::adapters::{DerivativeMarket, MessageTransport, SignalStore, SpotMarket, SubscriberRegistry};
use spread_scanner::config::{self, constants, logging};
use spread_scanner::core::{
    FanoutConfig, NotificationFanout, PriceFetcher, RateLimiter, RetryPolicy, ScanScheduler,
    SchedulerConfig, SpreadEvaluator, SpreadThresholds, SymbolMatcher,
};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    info!("🚀 Spread scanner starting...");
    constants::log_configuration();

    let config_path = std::env::var("SCANNER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = config::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let scanner = &config.scanner;
    info!(
        path = %config_path.display(),
        logging_threshold = scanner.logging_threshold_percent,
        notify_threshold = scanner.notify_threshold_percent,
        pair_budget = scanner.pair_budget,
        fast_tier_size = scanner.fast_tier_size,
        "[CONFIG] Configuration loaded"
    );

    // Market data
    let spot: Arc<dyn SpotMarket> = Arc::new(MexcSpotMarket::new(&config.spot_api, &config.ranking));
    let derivative: Arc<dyn DerivativeMarket> = Arc::new(MexcContractMarket::new(&config.derivative_api));
    let spot_limiter = Arc::new(RateLimiter::new(
        "spot",
        config.spot_api.max_requests_per_second,
        config.spot_api.max_concurrent,
    ));
    let derivative_limiter = Arc::new(RateLimiter::new(
        "derivative",
        config.derivative_api.max_requests_per_second,
        config.derivative_api.max_concurrent,
    ));

    // Persistence and subscribers
    let (store, registry): (Arc<dyn SignalStore>, Arc<dyn SubscriberRegistry>) =
        match SupabaseConfig::from_env().context("Supabase configuration")? {
            Some(supabase) => {
                info!("[CONFIG] Persisting signals to Supabase");
                (
                    Arc::new(SupabaseSignalStore::new(&supabase)?),
                    Arc::new(SupabaseSubscriberRegistry::new(&supabase)?),
                )
            }
            None => {
                warn!(
                    recipients = config.notifications.recipients.len(),
                    retained = DEFAULT_MEMORY_CAPACITY,
                    "[CONFIG] Supabase disabled, keeping the newest signals in memory"
                );
                (
                    Arc::new(MemorySignalStore::new()),
                    Arc::new(StaticSubscriberRegistry::new(config.notifications.recipients.clone())),
                )
            }
        };

    // Delivery
    let transport: Arc<dyn MessageTransport> =
        match TelegramConfig::from_env(&config.notifications.telegram_api_url) {
            Some(telegram) => Arc::new(TelegramTransport::new(telegram)?),
            None => {
                warn!("[CONFIG] TELEGRAM_BOT_TOKEN not set, alerts go to the log only");
                Arc::new(LogOnlyTransport)
            }
        };

    let scheduler = ScanScheduler::new(
        SymbolMatcher::new(spot.clone(), derivative.clone(), scanner.deny_substrings.clone()),
        PriceFetcher::new(
            spot,
            derivative,
            spot_limiter.clone(),
            derivative_limiter.clone(),
            RetryPolicy::from_env(),
        ),
        SpreadEvaluator::new(SpreadThresholds::new(
            scanner.logging_threshold_percent,
            scanner.notify_threshold_percent,
        )),
        store,
        registry,
        NotificationFanout::new(
            transport,
            FanoutConfig {
                max_concurrent: config.notifications.max_concurrent_sends,
                timeout_cooldown: config.notifications.timeout_cooldown(),
            },
        ),
        SchedulerConfig::from(scanner),
    );

    // Shutdown wiring
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let shutdown_signal = shutdown_tx.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("[SHUTDOWN] Graceful shutdown initiated");
                let _ = shutdown_signal.send(());
            }
            Err(err) => {
                error!(error = %err, "[SHUTDOWN] Failed to listen for Ctrl+C signal");
            }
        }
    });

    info!("⏳ Scanner running. Press Ctrl+C to stop.");
    scheduler.run(shutdown_rx).await;

    spot_limiter.close();
    derivative_limiter.close();
    drop(shutdown_tx);

    info!("[SHUTDOWN] Clean exit");
    Ok(())
}
