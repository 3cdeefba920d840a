//! Configuration types for scanner settings
//!
//! This module defines all configuration structs loaded from YAML. Every
//! field has a serde default so a partial (or empty) file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::types::RecipientId;
use crate::error::AppError;

// ============================================================================
// Scanner
// ============================================================================

/// Scan loop thresholds, tiering and pair selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Spread (percent) at or above which a signal is persisted
    pub logging_threshold_percent: f64,
    /// Spread (percent) at or above which a signal is also fanned out
    pub notify_threshold_percent: f64,
    /// Multiplier used for the leverage suggestion
    pub risk_multiplier: f64,
    /// Number of top-ranked pairs scanned on the fast interval
    pub fast_tier_size: usize,
    pub fast_interval_secs: u64,
    pub slow_interval_secs: u64,
    pub pairs_refresh_interval_secs: u64,
    /// Maximum number of pairs monitored
    pub pair_budget: usize,
    /// Spot symbols containing any of these substrings are never paired
    pub deny_substrings: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            logging_threshold_percent: 1.5,
            notify_threshold_percent: 2.0,
            risk_multiplier: 3.0,
            fast_tier_size: 50,
            fast_interval_secs: 30,
            slow_interval_secs: 120,
            pairs_refresh_interval_secs: 3600,
            pair_budget: 100,
            deny_substrings: vec!["TRUMP".to_string()],
        }
    }
}

impl ScannerConfig {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_secs(self.fast_interval_secs)
    }

    pub fn slow_interval(&self) -> Duration {
        Duration::from_secs(self.slow_interval_secs)
    }

    pub fn pairs_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.pairs_refresh_interval_secs)
    }

    /// Validate scanner configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("logging_threshold_percent", self.logging_threshold_percent),
            ("notify_threshold_percent", self.notify_threshold_percent),
            ("risk_multiplier", self.risk_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::Config(format!(
                    "scanner.{} must be a positive number (got {})",
                    name, value
                )));
            }
        }

        if self.notify_threshold_percent < self.logging_threshold_percent {
            return Err(AppError::Config(format!(
                "scanner.notify_threshold_percent ({}) must be >= logging_threshold_percent ({})",
                self.notify_threshold_percent, self.logging_threshold_percent
            )));
        }

        if self.fast_interval_secs == 0
            || self.slow_interval_secs == 0
            || self.pairs_refresh_interval_secs == 0
        {
            return Err(AppError::Config(
                "scanner intervals must be > 0 seconds".to_string(),
            ));
        }

        if self.pair_budget == 0 {
            return Err(AppError::Config(
                "scanner.pair_budget must be >= 1".to_string(),
            ));
        }

        if self.fast_tier_size == 0 {
            return Err(AppError::Config(
                "scanner.fast_tier_size must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Upstream APIs
// ============================================================================

/// One upstream REST endpoint family (spot or contract)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default = "default_max_requests_per_second")]
    pub max_requests_per_second: f64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_requests_per_second() -> f64 {
    20.0
}

fn default_max_concurrent() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_spot_api() -> UpstreamConfig {
    UpstreamConfig::new("https://api.mexc.com")
}

fn default_derivative_api() -> UpstreamConfig {
    UpstreamConfig::new("https://contract.mexc.com")
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_requests_per_second: default_max_requests_per_second(),
            max_concurrent: default_max_concurrent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self, section: &str) -> Result<(), AppError> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::Config(format!(
                "{}.base_url cannot be empty",
                section
            )));
        }

        if !self.max_requests_per_second.is_finite() || self.max_requests_per_second <= 0.0 {
            return Err(AppError::Config(format!(
                "{}.max_requests_per_second must be > 0 (got {})",
                section, self.max_requests_per_second
            )));
        }

        if self.max_concurrent == 0 {
            return Err(AppError::Config(format!(
                "{}.max_concurrent must be >= 1",
                section
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(format!(
                "{}.request_timeout_secs must be > 0",
                section
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Ranking & Notifications
// ============================================================================

/// Spot volume ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Only symbols ending with this quote currency are ranked
    pub quote_suffix: String,
    pub cache_ttl_secs: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            quote_suffix: "USDT".to_string(),
            cache_ttl_secs: 60,
        }
    }
}

impl RankingConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Alert delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub max_concurrent_sends: usize,
    /// Pause held by a send slot after a transport timeout
    pub timeout_cooldown_secs: u64,
    /// Static recipients, used when no subscriber database is configured
    pub recipients: Vec<RecipientId>,
    pub telegram_api_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sends: 5,
            timeout_cooldown_secs: 3,
            recipients: Vec::new(),
            telegram_api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn timeout_cooldown(&self) -> Duration {
        Duration::from_secs(self.timeout_cooldown_secs)
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default = "default_spot_api")]
    pub spot_api: UpstreamConfig,
    #[serde(default = "default_derivative_api")]
    pub derivative_api: UpstreamConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            spot_api: default_spot_api(),
            derivative_api: default_derivative_api(),
            ranking: RankingConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        self.scanner.validate()?;
        self.spot_api.validate("spot_api")?;
        self.derivative_api.validate("derivative_api")?;

        if self.ranking.quote_suffix.trim().is_empty() {
            return Err(AppError::Config(
                "ranking.quote_suffix cannot be empty".to_string(),
            ));
        }

        if self.notifications.max_concurrent_sends == 0 {
            return Err(AppError::Config(
                "notifications.max_concurrent_sends must be >= 1".to_string(),
            ));
        }

        if self.notifications.telegram_api_url.trim().is_empty() {
            return Err(AppError::Config(
                "notifications.telegram_api_url cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
