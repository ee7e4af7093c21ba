//! Provides portfolio valuation and single-quote decision helpers.
use crate::core::error::Result;
use crate::core::feed::PriceFeed;
use crate::core::symbol::{CurrencyCode, Symbol};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const BUY_REASON: &str = "Price below MA with positive momentum";
pub const NO_BUY_REASON: &str = "Conditions not met";

/// Value of a single holding at the fetched price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValue {
    pub amount: f64,
    pub price: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValue {
    pub currency: CurrencyCode,
    pub total_value: f64,
    pub breakdown: BTreeMap<Symbol, HoldingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCheck {
    pub symbol: Symbol,
    pub current_price: f64,
    pub threshold: f64,
    pub is_above: bool,
    pub difference: f64,
    pub percentage_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuySignal {
    pub symbol: Symbol,
    pub current_price: f64,
    pub ma_threshold: f64,
    pub change_24h: f64,
    pub should_buy: bool,
    pub reason: String,
}

/// Values `holdings` at current prices.
///
/// Symbols that are unsupported or fail to fetch are left out of both the
/// total and the breakdown; the valuation itself always succeeds. Holdings
/// that normalize to the same symbol are merged.
pub async fn portfolio_value<'a, I>(feed: &PriceFeed, holdings: I, currency: &CurrencyCode) -> PortfolioValue
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut amounts: BTreeMap<String, f64> = BTreeMap::new();
    for (symbol, amount) in holdings {
        *amounts.entry(symbol.trim().to_uppercase()).or_default() += amount;
    }

    let price_futures = amounts.iter().map(|(symbol, amount)| async move {
        (feed.get_price(symbol, currency).await, *amount)
    });

    let mut total_value = 0.0;
    let mut breakdown = BTreeMap::new();
    for (result, amount) in join_all(price_futures).await {
        match result {
            Ok(quote) => {
                let price = quote.price();
                let value = price * amount;
                total_value += value;
                breakdown.insert(quote.symbol, HoldingValue { amount, price, value });
            }
            Err(e) => debug!("Excluding holding from valuation: {}", e),
        }
    }

    PortfolioValue {
        currency: currency.clone(),
        total_value,
        breakdown,
    }
}

/// Compares the current price of `symbol` with `threshold`.
pub async fn is_above(
    feed: &PriceFeed,
    symbol: &str,
    threshold: f64,
    currency: &CurrencyCode,
) -> Result<ThresholdCheck> {
    let quote = feed.get_price(symbol, currency).await?;
    let current_price = quote.price();
    let difference = current_price - threshold;
    let percentage_diff = if threshold == 0.0 {
        0.0
    } else {
        difference / threshold * 100.0
    };

    Ok(ThresholdCheck {
        symbol: quote.symbol,
        current_price,
        threshold,
        is_above: current_price > threshold,
        difference,
        percentage_diff,
    })
}

/// Buy when the price sits below the caller-supplied moving-average level
/// and the last 24h change is positive. No history is computed here.
pub async fn buy_signal(feed: &PriceFeed, symbol: &str, ma_threshold: f64) -> Result<BuySignal> {
    let quote = feed.get_default_price(symbol).await?;
    let current_price = quote.price();
    let change_24h = quote.quote.change_24h;
    let should_buy = current_price < ma_threshold && change_24h > 0.0;

    Ok(BuySignal {
        symbol: quote.symbol,
        current_price,
        ma_threshold,
        change_24h,
        should_buy,
        reason: if should_buy { BUY_REASON } else { NO_BUY_REASON }.to_string(),
    })
}
