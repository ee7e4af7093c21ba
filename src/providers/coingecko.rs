use super::util::with_retry;
use crate::core::error::FetchError;
use crate::core::quote::QuoteFetcher;
use crate::core::symbol::CurrencyCode;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};

const DEFAULT_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Quote source backed by CoinGecko's `/simple/price` endpoint.
pub struct CoinGeckoFetcher {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl CoinGeckoFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("pricefeed/1.0")
            .build()?;
        Ok(CoinGeckoFetcher {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries: DEFAULT_RETRIES,
        })
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

/// Reshapes `{"<id>": {"<cur>": .., "<cur>_24h_change": .., "<cur>_market_cap": ..}}`
/// into the `{"price", "change_24h", "market_cap"}` payload. Absent fields are
/// left out so validation can name them.
fn extract_payload(body: &Value, source_id: &str, currency: &str) -> Result<Value, FetchError> {
    let record = body
        .get(source_id)
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::MalformedResponse(format!("No price data found for {source_id}")))?;

    let mut payload = Map::new();
    for (field, key) in [
        ("price", currency.to_string()),
        ("change_24h", format!("{currency}_24h_change")),
        ("market_cap", format!("{currency}_market_cap")),
    ] {
        if let Some(value) = record.get(&key) {
            payload.insert(field.to_string(), value.clone());
        }
    }
    Ok(Value::Object(payload))
}

#[async_trait]
impl QuoteFetcher for CoinGeckoFetcher {
    #[instrument(name = "CoinGeckoFetch", skip(self, currency), fields(currency = %currency))]
    async fn fetch(&self, source_id: &str, currency: &CurrencyCode) -> Result<Value, FetchError> {
        let url = Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[
                ("ids", source_id),
                ("vs_currencies", currency.as_str()),
                ("include_24hr_change", "true"),
                ("include_market_cap", "true"),
            ],
        )
        .map_err(|e| FetchError::Unavailable(format!("Invalid URL for {source_id}: {e}")))?;
        debug!("Requesting price data from {}", url);

        let response = with_retry(|| self.client.get(url.clone()).send(), self.retries, RETRY_DELAY)
            .await
            .map_err(|e| {
                FetchError::Unavailable(format!("Request error: {e} for {source_id}"))
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!(
                "HTTP error: {} for {}",
                response.status(),
                source_id
            )));
        }

        let text = response.text().await.map_err(|e| {
            FetchError::Unavailable(format!("Failed to read response for {source_id}: {e}"))
        })?;

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse price response");
            FetchError::MalformedResponse(format!("Failed to parse JSON response for {source_id}: {e}"))
        })?;

        extract_payload(&body, source_id, currency.as_str())
    }
}
