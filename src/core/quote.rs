//! Quote snapshots and the external source they come from.

use crate::core::error::FetchError;
use crate::core::symbol::{CurrencyCode, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Price, 24h change (percent) and market cap for one symbol/currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(price: f64, change_24h: f64, market_cap: f64) -> Self {
        Self {
            price,
            change_24h,
            market_cap,
            fetched_at: Utc::now(),
        }
    }

    /// Builds a quote from a `{"price", "change_24h", "market_cap"}` payload.
    ///
    /// Every field must be present and a finite number; price and market cap
    /// must not be negative.
    pub fn from_payload(payload: &Value) -> Result<Self, FetchError> {
        let object = payload.as_object().ok_or_else(|| {
            FetchError::MalformedResponse(format!("expected a JSON object, got: {payload}"))
        })?;

        let field = |name: &str| -> Result<f64, FetchError> {
            let value = object
                .get(name)
                .ok_or_else(|| FetchError::MalformedResponse(format!("missing field '{name}'")))?;
            let number = value.as_f64().ok_or_else(|| {
                FetchError::MalformedResponse(format!("field '{name}' is not a number: {value}"))
            })?;
            if !number.is_finite() {
                return Err(FetchError::MalformedResponse(format!(
                    "field '{name}' must be finite"
                )));
            }
            Ok(number)
        };

        let price = field("price")?;
        let change_24h = field("change_24h")?;
        let market_cap = field("market_cap")?;

        if price < 0.0 {
            return Err(FetchError::MalformedResponse(format!(
                "negative price: {price}"
            )));
        }
        if market_cap < 0.0 {
            return Err(FetchError::MalformedResponse(format!(
                "negative market cap: {market_cap}"
            )));
        }

        Ok(Self::new(price, change_24h, market_cap))
    }
}

/// A quote annotated with the pair it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub currency: CurrencyCode,
    #[serde(flatten)]
    pub quote: Quote,
}

impl PriceQuote {
    pub fn price(&self) -> f64 {
        self.quote.price
    }
}

/// External quote source.
///
/// Implementations return the raw `{"price", "change_24h", "market_cap"}`
/// payload; shape validation happens in [`Quote::from_payload`].
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    async fn fetch(&self, source_id: &str, currency: &CurrencyCode) -> Result<Value, FetchError>;
}
