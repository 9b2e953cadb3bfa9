//! OHLCV quote for the latest bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent completed or in-progress bar for one instrument at one
/// timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Bar time. `None` when the quote was restored from the snapshot table,
    /// which carries no time column.
    pub timestamp: Option<DateTime<Utc>>,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price (current market price for an in-progress bar)
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Quote {
    /// Create a new quote stamped with the bar time.
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Create a quote without a bar time.
    pub fn untimed(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
