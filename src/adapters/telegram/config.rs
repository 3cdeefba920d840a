//! Telegram bot credentials

use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather
    pub bot_token: String,
    /// Bot API base URL (overridable for tests)
    pub api_url: String,
    pub request_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Read `TELEGRAM_BOT_TOKEN`. Returns `None` when unset, empty or a
    /// placeholder.
    #[must_use]
    pub fn from_env(api_url: &str) -> Option<Self> {
        match std::env::var("TELEGRAM_BOT_TOKEN") {
            Ok(token) if token.contains("your-bot-token") => {
                warn!("TELEGRAM_BOT_TOKEN contains placeholder value, Telegram disabled");
                None
            }
            Ok(token) if !token.trim().is_empty() => Some(Self::new(token.trim(), api_url)),
            _ => {
                debug!("TELEGRAM_BOT_TOKEN not set, Telegram disabled");
                None
            }
        }
    }

    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}
