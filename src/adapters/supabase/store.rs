//! Supabase PostgREST adapters
//!
//! `SupabaseSignalStore` inserts one row per signal into
//! `arbitrage_signals`. `SupabaseSubscriberRegistry` reads chat ids from
//! `subscribers`. Both send the anon key as `apikey` and bearer token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::adapters::errors::StoreError;
use crate::adapters::traits::{SignalStore, SubscriberRegistry};
use crate::core::types::{ArbitrageSignal, RecipientId, SignalDirection};

use super::config::SupabaseConfig;

const SIGNALS_TABLE: &str = "arbitrage_signals";
const SUBSCRIBERS_TABLE: &str = "subscribers";

/// Client carrying the auth headers, `None` when persistence is disabled
fn build_client(config: &SupabaseConfig) -> Result<Option<reqwest::Client>, StoreError> {
    if !config.enabled {
        return Ok(None);
    }

    let header = |value: &str| {
        HeaderValue::from_str(value)
            .map_err(|e| StoreError::InvalidData(format!("Invalid Supabase key header: {}", e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert("apikey", header(&config.anon_key)?);
    headers.insert(AUTHORIZATION, header(&format!("Bearer {}", config.anon_key))?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .connect_timeout(config.request_timeout)
        .build()?;
    Ok(Some(client))
}

/// Map a non-success PostgREST status to a `StoreError`
async fn status_error(response: reqwest::Response, context: &str) -> StoreError {
    match response.status() {
        StatusCode::UNAUTHORIZED => StoreError::Database("Invalid Supabase credentials".to_string()),
        StatusCode::CONFLICT => {
            StoreError::Database(format!("{} already exists (unique constraint)", context))
        }
        status => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            StoreError::Database(format!("Supabase error {}: {}", status, body))
        }
    }
}

// =============================================================================
// Signal store
// =============================================================================

/// Row shape of `arbitrage_signals`
#[derive(Debug, Serialize)]
struct SignalRecord<'a> {
    id: Uuid,
    spot_symbol: &'a str,
    derivative_symbol: &'a str,
    spot_price: f64,
    derivative_price: f64,
    spread_percent: f64,
    volume_24h: f64,
    direction: &'static str,
    detected_at: DateTime<Utc>,
}

impl<'a> From<&'a ArbitrageSignal> for SignalRecord<'a> {
    fn from(signal: &'a ArbitrageSignal) -> Self {
        Self {
            id: Uuid::now_v7(),
            spot_symbol: &signal.spot_symbol,
            derivative_symbol: &signal.derivative_symbol,
            spot_price: signal.spot_price,
            derivative_price: signal.derivative_price,
            spread_percent: signal.spread_percent,
            volume_24h: signal.volume,
            direction: match signal.direction {
                SignalDirection::SpotHigher => "spot_higher",
                SignalDirection::DerivativeHigher => "derivative_higher",
            },
            detected_at: signal.observed_at,
        }
    }
}

pub struct SupabaseSignalStore {
    endpoint: String,
    client: Option<reqwest::Client>,
}

impl SupabaseSignalStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        Ok(Self {
            endpoint: config.rest_url(SIGNALS_TABLE),
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl SignalStore for SupabaseSignalStore {
    async fn save(&self, signal: &ArbitrageSignal) -> Result<(), StoreError> {
        let Some(client) = self.client.as_ref() else {
            debug!(symbol = %signal.spot_symbol, "Supabase disabled, signal not saved");
            return Ok(());
        };

        let response = client
            .post(&self.endpoint)
            .header("Prefer", "return=minimal")
            .json(&SignalRecord::from(signal))
            .send()
            .await?;

        if response.status() == StatusCode::CREATED {
            info!(
                symbol = %signal.spot_symbol,
                spread = %format!("{:.4}%", signal.spread_percent),
                "[SIGNAL] Saved to Supabase"
            );
            return Ok(());
        }

        let err = status_error(response, "Signal").await;
        error!(symbol = %signal.spot_symbol, error = %err, "[SIGNAL] Supabase insert failed");
        Err(err)
    }
}

// =============================================================================
// Subscriber registry
// =============================================================================

#[derive(Debug, Deserialize)]
struct SubscriberRow {
    user_id: RecipientId,
}

pub struct SupabaseSubscriberRegistry {
    endpoint: String,
    client: Option<reqwest::Client>,
}

impl SupabaseSubscriberRegistry {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        Ok(Self {
            endpoint: format!("{}?select=user_id", config.rest_url(SUBSCRIBERS_TABLE)),
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl SubscriberRegistry for SupabaseSubscriberRegistry {
    async fn list(&self) -> Result<Vec<RecipientId>, StoreError> {
        let Some(client) = self.client.as_ref() else {
            debug!("Supabase disabled, no subscribers");
            return Ok(Vec::new());
        };

        let response = client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response, "Subscriber").await);
        }

        let text = response.text().await?;
        let rows: Vec<SubscriberRow> = serde_json::from_str(&text)
            .map_err(|e| StoreError::InvalidData(format!("Invalid subscriber list: {} - {}", e, text)))?;

        debug!(count = rows.len(), "Subscribers loaded");
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }
}
