//! Error types for the ticker refresher.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum TickerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market data provider errors.
///
/// The refresh engine treats every variant the same way: the call failed and
/// the previous value is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for {0}")]
    NoDataAvailable(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Snapshot store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{} is locked by another process (gave up after {attempts} attempts)", path.display())]
    Locked { path: PathBuf, attempts: u32 },

    #[error("Corrupt snapshot table {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether the failure is contention that the next cycle will retry
    /// naturally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Locked { .. })
    }
}

/// Result type alias.
pub type TickerResult<T> = Result<T, TickerError>;
