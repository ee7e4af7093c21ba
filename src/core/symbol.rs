//! Supported symbols and the normalized identifiers derived from them.

use crate::core::error::{OracleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Supported tickers and their CoinGecko asset ids.
pub const DEFAULT_SYMBOLS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
    ("BNB", "binancecoin"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("MATIC", "matic-network"),
    ("DOT", "polkadot"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
    ("ATOM", "cosmos"),
];

/// An uppercase ticker known to a [`SymbolRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lowercase currency code such as `usd`. Only the case is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("usd")
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Identifies one cached quote slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: Symbol,
    pub currency: CurrencyCode,
}

impl CacheKey {
    pub fn new(symbol: Symbol, currency: CurrencyCode) -> Self {
        Self { symbol, currency }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.symbol, self.currency)
    }
}

/// Fixed table of supported tickers, built once at startup.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    sources: BTreeMap<String, String>,
}

impl SymbolRegistry {
    pub fn new<I, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let sources = entries
            .into_iter()
            .map(|(symbol, source_id)| (canonical(symbol.as_ref()), source_id.into()))
            .collect();
        Self { sources }
    }

    /// Uppercases `symbol` and checks that it is supported.
    pub fn normalize(&self, symbol: &str) -> Result<Symbol> {
        let symbol = canonical(symbol);
        if self.sources.contains_key(&symbol) {
            Ok(Symbol(symbol))
        } else {
            Err(OracleError::UnsupportedSymbol {
                symbol,
                supported: self.supported(),
            })
        }
    }

    pub fn source_id(&self, symbol: &Symbol) -> Option<&str> {
        self.sources.get(symbol.as_str()).map(String::as_str)
    }

    pub fn supported(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOLS.iter().copied())
    }
}

fn canonical(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
