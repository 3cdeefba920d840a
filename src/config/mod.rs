//! Configuration module for scanner settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `ScannerConfig`, `UpstreamConfig`, ...)
//! - YAML loading functionality (`load_config`)
//! - Tuning constants with environment variable overrides
//! - Logging initialisation

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, NotificationConfig, RankingConfig, ScannerConfig, UpstreamConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};
