//! Supabase connection settings
//!
//! Credentials come from the environment only:
//! - `SUPABASE_ENABLED`: "false" turns persistence off (default on)
//! - `SUPABASE_URL`: project URL, must be `https://...supabase...`
//! - `SUPABASE_ANON_KEY`: API key sent as `apikey` and bearer token
//! - `SUPABASE_TIMEOUT_SECS`: per-request timeout (default 10)

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

const URL_PLACEHOLDER: &str = "your-project";
const KEY_PLACEHOLDER: &str = "your-anon-key";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SupabaseConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid Supabase URL format: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g. <https://xxx.supabase.co>)
    pub url: String,
    pub anon_key: String,
    /// When false, the store accepts signals without sending them anywhere
    pub enabled: bool,
    /// Bounds connect and the whole request
    pub request_timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            enabled: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Same credentials, persistence switched off
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Load from the environment.
    ///
    /// - `Ok(None)` when disabled, unset, or still holding the template URL
    /// - `Err` when a URL is set but malformed, or the key is missing
    pub fn from_env() -> Result<Option<Self>, SupabaseConfigError> {
        let enabled = std::env::var("SUPABASE_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        if !enabled {
            info!("Supabase persistence disabled via SUPABASE_ENABLED=false");
            return Ok(None);
        }

        let url = match std::env::var("SUPABASE_URL") {
            Ok(u) if u.contains(URL_PLACEHOLDER) => {
                warn!("SUPABASE_URL contains placeholder value, Supabase disabled");
                return Ok(None);
            }
            Ok(u) if !u.is_empty() => u,
            _ => {
                debug!("SUPABASE_URL not set, Supabase disabled");
                return Ok(None);
            }
        };

        if !url.starts_with("https://") || !url.contains("supabase") {
            return Err(SupabaseConfigError::InvalidUrl(url));
        }

        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| SupabaseConfigError::MissingEnvVar("SUPABASE_ANON_KEY".to_string()))?;

        if anon_key.is_empty() || anon_key.contains(KEY_PLACEHOLDER) {
            return Err(SupabaseConfigError::MissingEnvVar(
                "SUPABASE_ANON_KEY (contains placeholder)".to_string(),
            ));
        }

        let request_timeout = match std::env::var("SUPABASE_TIMEOUT_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "Invalid SUPABASE_TIMEOUT_SECS, using default");
                    DEFAULT_REQUEST_TIMEOUT
                }
            },
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        info!(url = %url, timeout_secs = request_timeout.as_secs(), "Supabase configuration loaded");
        Ok(Some(Self::new(url, anon_key).with_timeout(request_timeout)))
    }

    /// PostgREST endpoint for `table`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }
}
