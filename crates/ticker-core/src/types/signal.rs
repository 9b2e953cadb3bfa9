//! Categorical technical-analysis recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Buy/sell recommendation for one instrument at one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Signal {
    /// Map an aggregate recommendation score in `[-1, 1]` to a signal.
    /// Returns `None` for scores outside the range or NaN.
    pub fn from_score(score: f64) -> Option<Signal> {
        if !(-1.0..=1.0).contains(&score) {
            return None;
        }
        let signal = if score < -0.5 {
            Signal::StrongSell
        } else if score < -0.1 {
            Signal::Sell
        } else if score <= 0.1 {
            Signal::Neutral
        } else if score <= 0.5 {
            Signal::Buy
        } else {
            Signal::StrongBuy
        };
        Some(signal)
    }

    /// Canonical upper-case name, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Neutral => "NEUTRAL",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "STRONG_BUY" => Ok(Signal::StrongBuy),
            "BUY" => Ok(Signal::Buy),
            "NEUTRAL" => Ok(Signal::Neutral),
            "SELL" => Ok(Signal::Sell),
            "STRONG_SELL" => Ok(Signal::StrongSell),
            _ => Err(format!("Invalid signal: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_score_thresholds() {
        assert_eq!(Signal::from_score(-1.0), Some(Signal::StrongSell));
        assert_eq!(Signal::from_score(-0.5), Some(Signal::Sell));
        assert_eq!(Signal::from_score(-0.1), Some(Signal::Neutral));
        assert_eq!(Signal::from_score(0.0), Some(Signal::Neutral));
        assert_eq!(Signal::from_score(0.1), Some(Signal::Neutral));
        assert_eq!(Signal::from_score(0.3), Some(Signal::Buy));
        assert_eq!(Signal::from_score(0.5), Some(Signal::Buy));
        assert_eq!(Signal::from_score(0.51), Some(Signal::StrongBuy));
        assert_eq!(Signal::from_score(1.2), None);
        assert_eq!(Signal::from_score(f64::NAN), None);
    }

    #[test]
    fn test_signal_parse_and_display() {
        for signal in [
            Signal::StrongBuy,
            Signal::Buy,
            Signal::Neutral,
            Signal::Sell,
            Signal::StrongSell,
        ] {
            assert_eq!(signal.to_string().parse::<Signal>().unwrap(), signal);
        }
        assert_eq!("strong buy".parse::<Signal>().unwrap(), Signal::StrongBuy);
        assert!("HOLD".parse::<Signal>().is_err());
    }
}
