pub mod cli;
pub mod core;
pub mod providers;

use crate::core::cache::QuoteCache;
use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, PriceFeed};
use crate::providers::CoinGeckoFetcher;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Price {
        symbol: String,
        currency: Option<String>,
    },
    Prices {
        symbols: Vec<String>,
        currency: Option<String>,
    },
    Coins,
    Compare {
        symbol1: String,
        symbol2: String,
    },
    Above {
        symbol: String,
        threshold: f64,
        currency: Option<String>,
    },
    Signal {
        symbol: String,
        ma_threshold: f64,
    },
    Portfolio,
    Alerts,
}

/// Loads `config_path`, or the default config file when present.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load_from_path(&path)
            } else {
                debug!("No config at {}, using defaults", path.display());
                Ok(AppConfig::default())
            }
        }
    }
}

/// Wires the configured registry, cache and CoinGecko source into a feed.
pub fn build_feed(config: &AppConfig) -> Result<PriceFeed> {
    let fetcher = CoinGeckoFetcher::new(config.coingecko_url())?;
    let cache = QuoteCache::new(config.cache.ttl(), config.cache.fetch_timeout());
    Ok(PriceFeed::new(config.registry(), cache, Arc::new(fetcher))
        .with_default_currency(config.currency()))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Price feed starting...");

    let config = load_config(config_path)?;
    debug!("Loaded config: {config:#?}");

    let feed = build_feed(&config)?;
    let currency_or_default =
        |currency: Option<String>| currency.map_or_else(|| config.currency(), |c| CurrencyCode::new(&c));

    match command {
        AppCommand::Price { symbol, currency } => {
            cli::prices::run_price(&feed, &symbol, &currency_or_default(currency)).await
        }
        AppCommand::Prices { symbols, currency } => {
            cli::prices::run_prices(&feed, &symbols, &currency_or_default(currency)).await
        }
        AppCommand::Coins => cli::prices::run_coins(&feed),
        AppCommand::Compare { symbol1, symbol2 } => {
            cli::signals::run_compare(&feed, &symbol1, &symbol2).await
        }
        AppCommand::Above {
            symbol,
            threshold,
            currency,
        } => {
            cli::signals::run_above(&feed, &symbol, threshold, &currency_or_default(currency))
                .await
        }
        AppCommand::Signal {
            symbol,
            ma_threshold,
        } => cli::signals::run_signal(&feed, &symbol, ma_threshold).await,
        AppCommand::Portfolio => {
            cli::portfolio::run(&feed, &config.holdings, &config.currency()).await
        }
        AppCommand::Alerts => cli::alerts::run(&feed, &config.user, &config.alerts).await,
    }
}
