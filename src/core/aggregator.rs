//! Batch lookups and pairwise comparisons over the price feed.

use crate::core::error::{OracleError, Result};
use crate::core::feed::PriceFeed;
use crate::core::quote::PriceQuote;
use crate::core::symbol::{CurrencyCode, Symbol};
use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

/// Per-symbol outcome of [`get_many`], in request order.
#[derive(Debug)]
pub struct BatchQuotes {
    pub currency: CurrencyCode,
    /// Number of requested symbols, failed ones included.
    pub count: usize,
    pub per_symbol: Vec<(String, Result<PriceQuote>)>,
}

impl BatchQuotes {
    pub fn successes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.per_symbol.iter().filter_map(|(_, r)| r.as_ref().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub pair: String,
    pub symbol1: Symbol,
    pub price1: f64,
    pub symbol2: Symbol,
    pub price2: f64,
    pub ratio: f64,
    pub higher: Symbol,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportedCoins {
    pub count: usize,
    pub symbols: Vec<String>,
}

/// Fetches every symbol concurrently. One symbol failing never aborts the
/// others; its error is kept in place in `per_symbol`.
pub async fn get_many(feed: &PriceFeed, symbols: &[String], currency: &CurrencyCode) -> BatchQuotes {
    let futures = symbols.iter().map(|symbol| async move {
        let result = feed.get_price(symbol, currency).await;
        if let Err(e) = &result {
            debug!("Price fetch error for {}: {}", symbol, e);
        }
        (symbol.clone(), result)
    });
    let per_symbol: Vec<_> = join_all(futures).await;

    BatchQuotes {
        currency: currency.clone(),
        count: per_symbol.len(),
        per_symbol,
    }
}

/// Compares two symbols in the feed's default currency.
///
/// Fails with [`OracleError::ComparisonFailed`] if either price is unavailable.
pub async fn compare(feed: &PriceFeed, symbol1: &str, symbol2: &str) -> Result<Comparison> {
    let (first, second) = futures::join!(
        feed.get_default_price(symbol1),
        feed.get_default_price(symbol2)
    );
    let (first, second) = match (first, second) {
        (Ok(first), Ok(second)) => (first, second),
        (first, second) => {
            debug!(
                "Comparison {}/{} failed: {:?} / {:?}",
                symbol1,
                symbol2,
                first.err(),
                second.err()
            );
            return Err(OracleError::ComparisonFailed);
        }
    };

    let price1 = first.price();
    let price2 = second.price();
    let ratio = if price2 == 0.0 { 0.0 } else { price1 / price2 };
    let higher = if price1 > price2 {
        first.symbol.clone()
    } else {
        second.symbol.clone()
    };

    Ok(Comparison {
        pair: format!("{}/{}", first.symbol, second.symbol),
        symbol1: first.symbol,
        price1,
        symbol2: second.symbol,
        price2,
        ratio,
        higher,
    })
}

pub fn supported_coins(feed: &PriceFeed) -> SupportedCoins {
    let symbols = feed.registry().supported();
    SupportedCoins {
        count: symbols.len(),
        symbols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FetchError;
    use crate::core::feed::test_support::{StaticFetcher, feed_with};
    use std::sync::Arc;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_many_keeps_order_and_failures() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            ("bitcoin", 50000.0, 2.0),
            ("solana", 150.0, -3.0),
        ]));
        let feed = feed_with(fetcher);

        let batch = get_many(
            &feed,
            &symbols(&["sol", "ETH", "ZZZ", "btc"]),
            &CurrencyCode::new("usd"),
        )
        .await;

        assert_eq!(batch.count, 4);
        let requested: Vec<_> = batch.per_symbol.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(requested, vec!["sol", "ETH", "ZZZ", "btc"]);

        assert_eq!(batch.per_symbol[0].1.as_ref().unwrap().price(), 150.0);
        assert!(matches!(
            batch.per_symbol[1].1,
            Err(OracleError::Fetch(FetchError::Unavailable(_)))
        ));
        assert!(matches!(
            batch.per_symbol[2].1,
            Err(OracleError::UnsupportedSymbol { .. })
        ));
        assert_eq!(batch.per_symbol[3].1.as_ref().unwrap().price(), 50000.0);
        assert_eq!(batch.successes().count(), 2);
    }

    #[tokio::test]
    async fn test_get_many_empty() {
        let feed = feed_with(Arc::new(StaticFetcher::new(&[])));
        let batch = get_many(&feed, &[], &CurrencyCode::default()).await;
        assert_eq!(batch.count, 0);
        assert!(batch.per_symbol.is_empty());
    }

    #[tokio::test]
    async fn test_compare() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            ("bitcoin", 50000.0, 2.0),
            ("ethereum", 2500.0, 1.0),
        ]));
        let feed = feed_with(fetcher);

        let comparison = compare(&feed, "btc", "eth").await.unwrap();
        assert_eq!(comparison.pair, "BTC/ETH");
        assert_eq!(comparison.price1, 50000.0);
        assert_eq!(comparison.price2, 2500.0);
        assert_eq!(comparison.ratio, 20.0);
        assert_eq!(comparison.higher.as_str(), "BTC");

        let reversed = compare(&feed, "ETH", "BTC").await.unwrap();
        assert_eq!(reversed.ratio, 0.05);
        assert_eq!(reversed.higher.as_str(), "BTC");
    }

    #[tokio::test]
    async fn test_compare_zero_price_ratio_is_zero() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            ("bitcoin", 50000.0, 2.0),
            ("ethereum", 0.0, 0.0),
        ]));
        let feed = feed_with(fetcher);

        let comparison = compare(&feed, "BTC", "ETH").await.unwrap();
        assert_eq!(comparison.ratio, 0.0);
        assert_eq!(comparison.higher.as_str(), "BTC");
    }

    #[tokio::test]
    async fn test_compare_tie_resolves_to_second() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            ("tether", 1.0, 0.0),
            ("usd-coin", 1.0, 0.0),
        ]));
        let feed = feed_with(fetcher);

        let comparison = compare(&feed, "USDT", "USDC").await.unwrap();
        assert_eq!(comparison.ratio, 1.0);
        assert_eq!(comparison.higher.as_str(), "USDC");
    }

    #[tokio::test]
    async fn test_compare_fails_if_either_fails() {
        let fetcher = Arc::new(StaticFetcher::new(&[("bitcoin", 50000.0, 2.0)]));
        let feed = feed_with(fetcher);

        assert_eq!(
            compare(&feed, "BTC", "ETH").await.unwrap_err(),
            OracleError::ComparisonFailed
        );
        assert_eq!(
            compare(&feed, "ZZZ", "BTC").await.unwrap_err(),
            OracleError::ComparisonFailed
        );
    }

    #[test]
    fn test_supported_coins() {
        let feed = feed_with(Arc::new(StaticFetcher::new(&[])));
        let coins = supported_coins(&feed);
        assert_eq!(coins.count, 15);
        assert!(coins.symbols.contains(&"ATOM".to_string()));
    }
}
