use crate::core::cache::{DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL};
use crate::core::symbol::{CurrencyCode, DEFAULT_SYMBOLS, SymbolRegistry};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: DEFAULT_COINGECKO_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Zero means every request refreshes the quote.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_user() -> String {
    "local".to_string()
}

fn default_currency() -> String {
    CurrencyCode::default().to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlertConfig {
    pub symbol: String,
    pub threshold: f64,
    pub direction: crate::core::alerts::AlertDirection,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Caller identity that owns the configured alerts.
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Overrides the built-in symbol table when present.
    #[serde(default)]
    pub symbols: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub holdings: BTreeMap<String, f64>,
    #[serde(default)]
    pub alerts: Vec<AlertConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            user: default_user(),
            currency: default_currency(),
            cache: CacheConfig::default(),
            providers: ProvidersConfig::default(),
            symbols: None,
            holdings: BTreeMap::new(),
            alerts: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "pricefeed", "pricefeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn registry(&self) -> SymbolRegistry {
        match &self.symbols {
            Some(symbols) => SymbolRegistry::new(symbols.iter().map(|(s, id)| (s, id.clone()))),
            None => SymbolRegistry::new(DEFAULT_SYMBOLS.iter().copied()),
        }
    }

    pub fn currency(&self) -> CurrencyCode {
        CurrencyCode::new(&self.currency)
    }

    pub fn coingecko_url(&self) -> &str {
        self.providers
            .coingecko
            .as_ref()
            .map_or(DEFAULT_COINGECKO_URL, |p| &p.base_url)
    }
}
