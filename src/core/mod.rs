//! Core price feed: symbols, quotes, caching and the engines built on them

pub mod aggregator;
pub mod alerts;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod log;
pub mod quote;
pub mod symbol;
pub mod valuation;

// Re-export main types for cleaner imports
pub use alerts::{AlertDirection, AlertEngine, AlertRule};
pub use cache::QuoteCache;
pub use error::{FetchError, OracleError};
pub use feed::PriceFeed;
pub use quote::{PriceQuote, Quote, QuoteFetcher};
pub use symbol::{CacheKey, CurrencyCode, Symbol, SymbolRegistry};
