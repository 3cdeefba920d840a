//! Telegram delivery: Bot API transport and alert formatting

pub mod config;
pub mod format;
pub mod transport;

pub use config::TelegramConfig;
pub use format::{render_message, render_signal};
pub use transport::TelegramTransport;
