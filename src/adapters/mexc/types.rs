//! API response types for MEXC spot and contract REST endpoints.
//!
//! Numeric fields arrive either as JSON strings ("50000.1") or numbers
//! depending on endpoint, so they go through `Numeric`.

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::config::constants::{
    DERIVATIVE_RATE_LIMIT_CODE, DERIVATIVE_SYMBOL_FIELDS, SPOT_PRICE_FIELDS, SPOT_VOLUME_FIELDS,
};

/// A number that may be encoded as a JSON string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Finite value, or `None` for empty/unparseable text
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

// =============================================================================
// Spot
// =============================================================================

/// One entry of `GET /api/v3/ticker/24hr`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTicker {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub last_price: Option<Numeric>,
    #[serde(default)]
    pub price: Option<Numeric>,
    #[serde(default)]
    pub quote_volume: Option<Numeric>,
}

impl SpotTicker {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "lastPrice" => self.last_price.as_ref().and_then(Numeric::as_f64),
            "price" => self.price.as_ref().and_then(Numeric::as_f64),
            "quoteVolume" => self.quote_volume.as_ref().and_then(Numeric::as_f64),
            _ => None,
        }
    }

    fn first_of(&self, candidates: &[&str]) -> Option<f64> {
        candidates.iter().find_map(|name| self.field(name))
    }

    /// Price from the first usable candidate field
    pub fn price(&self, symbol: &str) -> ExchangeResult<f64> {
        self.first_of(SPOT_PRICE_FIELDS)
            .ok_or_else(|| ExchangeError::MissingField {
                symbol: symbol.to_string(),
                candidates: SPOT_PRICE_FIELDS,
            })
    }

    /// 24h quote volume, `None` when absent
    pub fn volume(&self) -> Option<f64> {
        self.first_of(SPOT_VOLUME_FIELDS)
    }
}

// =============================================================================
// Contract
// =============================================================================

/// Contract API envelope: `{"success": .., "code": .., "data": ..}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContractEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTicker {
    #[serde(default)]
    pub last_price: Option<Numeric>,
}

impl ContractEnvelope {
    /// Ticker price, or `RateLimited` when the envelope carries code 510
    pub fn ticker_price(&self, symbol: &str) -> ExchangeResult<f64> {
        let ticker = serde_json::from_value::<ContractTicker>(self.data.clone()).ok();
        if let Some(price) = ticker
            .as_ref()
            .and_then(|t| t.last_price.as_ref())
            .and_then(Numeric::as_f64)
        {
            return Ok(price);
        }

        if self.code == DERIVATIVE_RATE_LIMIT_CODE {
            return Err(ExchangeError::RateLimited { code: self.code });
        }

        Err(ExchangeError::InvalidResponse(format!(
            "No lastPrice for {} (code {}, message {:?})",
            symbol, self.code, self.message
        )))
    }

    /// Symbols from `GET /api/v1/contract/detail`. `data` must be a list;
    /// entries without any symbol field are skipped.
    pub fn listed_symbols(&self) -> ExchangeResult<Vec<String>> {
        let Value::Array(items) = &self.data else {
            return Err(ExchangeError::InvalidResponse(format!(
                "Contract detail data is not a list (code {})",
                self.code
            )));
        };

        Ok(items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                DERIVATIVE_SYMBOL_FIELDS.iter().find_map(|field| {
                    obj.get(*field)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            })
            .collect())
    }
}
