//! Tradable instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticker symbol qualified by the exchange it trades on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol, also the key of the persisted table.
    pub symbol: String,
    /// Exchange qualifier, e.g. `NSE`.
    pub exchange: String,
}

impl Instrument {
    /// Create a new instrument. Both parts are trimmed and upper-cased.
    pub fn new(symbol: impl AsRef<str>, exchange: impl AsRef<str>) -> Self {
        Self {
            symbol: symbol.as_ref().trim().to_uppercase(),
            exchange: exchange.as_ref().trim().to_uppercase(),
        }
    }

    /// Build a watch list from symbols on a single exchange, dropping blanks
    /// and repeated symbols while keeping first-seen order.
    pub fn watchlist<I, S>(symbols: I, exchange: &str) -> Vec<Instrument>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<Instrument> = Vec::new();
        for symbol in symbols {
            let instrument = Instrument::new(symbol, exchange);
            if instrument.symbol.is_empty() || list.iter().any(|i| i.symbol == instrument.symbol) {
                continue;
            }
            list.push(instrument);
        }
        list
    }

    /// `EXCHANGE:SYMBOL` form used by charting-site APIs.
    pub fn qualified(&self) -> String {
        format!("{}:{}", self.exchange, self.symbol)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}
