//! Error kinds surfaced by the price feed.

use std::time::Duration;
use thiserror::Error;

/// Failure of the external quote source, or unusable data coming back from it.
///
/// `Clone` so that one failed fetch can be handed to every caller that was
/// coalesced onto it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("quote source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed quote response: {0}")]
    MalformedResponse(String),
    #[error("quote fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Top-level error type for price feed operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    #[error("unsupported symbol: {symbol}")]
    UnsupportedSymbol {
        symbol: String,
        supported: Vec<String>,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to fetch one or both prices")]
    ComparisonFailed,

    #[error("no alert with id {id}")]
    UnknownAlert { id: u64 },
}

pub type Result<T, E = OracleError> = std::result::Result<T, E>;
