//! The price feed: symbol registry, quote cache and external source composed
//! into a single `get_price` entry point that the derived engines build on.

use crate::core::cache::QuoteCache;
use crate::core::error::{OracleError, Result};
use crate::core::quote::{PriceQuote, Quote, QuoteFetcher};
use crate::core::symbol::{CacheKey, CurrencyCode, SymbolRegistry};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct PriceFeed {
    registry: SymbolRegistry,
    cache: QuoteCache,
    fetcher: Arc<dyn QuoteFetcher>,
    default_currency: CurrencyCode,
}

impl PriceFeed {
    pub fn new(registry: SymbolRegistry, cache: QuoteCache, fetcher: Arc<dyn QuoteFetcher>) -> Self {
        Self {
            registry,
            cache,
            fetcher,
            default_currency: CurrencyCode::default(),
        }
    }

    pub fn with_default_currency(mut self, currency: CurrencyCode) -> Self {
        self.default_currency = currency;
        self
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn default_currency(&self) -> &CurrencyCode {
        &self.default_currency
    }

    /// Current quote for `symbol` in `currency`, served from the cache when fresh.
    #[instrument(name = "PriceFetch", skip(self, currency), fields(currency = %currency))]
    pub async fn get_price(&self, symbol: &str, currency: &CurrencyCode) -> Result<PriceQuote> {
        let symbol = self.registry.normalize(symbol)?;
        let source_id = self
            .registry
            .source_id(&symbol)
            .ok_or_else(|| OracleError::UnsupportedSymbol {
                symbol: symbol.to_string(),
                supported: self.registry.supported(),
            })?
            .to_string();

        let key = CacheKey::new(symbol, currency.clone());
        let quote = self
            .cache
            .get_or_fetch(&key, || async {
                debug!("Requesting quote for {} in {}", source_id, key.currency);
                let payload = self.fetcher.fetch(&source_id, &key.currency).await?;
                Quote::from_payload(&payload)
            })
            .await?;

        Ok(PriceQuote {
            symbol: key.symbol,
            currency: key.currency,
            quote,
        })
    }

    /// Same as [`PriceFeed::get_price`] in the default currency.
    pub async fn get_default_price(&self, symbol: &str) -> Result<PriceQuote> {
        self.get_price(symbol, &self.default_currency).await
    }
}
