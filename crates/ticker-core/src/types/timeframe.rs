//! Timeframe definitions for market data.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar aggregation interval. The set is closed: one persisted signal column
/// exists per variant, in [`Timeframe::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1 minute bars
    #[serde(rename = "1m")]
    Minute1,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// Daily bars
    #[serde(rename = "1d")]
    Daily,
}

impl Timeframe {
    /// Every timeframe, finest first. This is also the column order of the
    /// persisted table.
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Minute1,
        Timeframe::Minute15,
        Timeframe::Hour1,
        Timeframe::Daily,
    ];

    /// Timeframe the quote is fetched at.
    pub const BASE: Timeframe = Timeframe::Minute1;

    /// Get the duration of the timeframe in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Timeframe::Minute1 => 60,
            Timeframe::Minute15 => 900,
            Timeframe::Hour1 => 3600,
            Timeframe::Daily => 86400,
        }
    }

    /// Human-readable label, used as the persisted column header.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1 Minute",
            Timeframe::Minute15 => "15 Minute",
            Timeframe::Hour1 => "1 Hour",
            Timeframe::Daily => "1 Day",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Daily => "1d",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::Minute1.as_secs(), 60);
        assert_eq!(Timeframe::Hour1.as_secs(), 3600);
        assert_eq!(Timeframe::Daily.as_secs(), 86400);
    }

    #[test]
    fn test_all_is_finest_first() {
        assert_eq!(Timeframe::ALL[0], Timeframe::BASE);
        assert!(Timeframe::ALL.windows(2).all(|w| w[0].as_secs() < w[1].as_secs()));
    }
}
