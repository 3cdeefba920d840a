//! Supabase persistence: signal history and subscriber list

pub mod config;
mod store;

pub use config::{SupabaseConfig, SupabaseConfigError};
pub use store::{SupabaseSignalStore, SupabaseSubscriberRegistry};
