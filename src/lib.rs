//! MEXC spot/derivative spread scanner
//!
//! - `core`: pair discovery, rate-limited price fetching, spread evaluation,
//!   alert fan-out and the tiered scan loop
//! - `adapters`: MEXC REST, Supabase, Telegram and in-memory collaborators
//! - `config`: YAML configuration, env-tunable constants, logging setup

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;

pub use error::AppError;
