//! Per-instrument aggregate of the latest quote and all signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Instrument, Quote, Signal, Timeframe};

/// Latest known values for one instrument.
///
/// Absent fields are the "unknown" sentinel. Updates go through
/// [`Row::merge`], which only ever overwrites fields that were fetched, so a
/// failed fetch leaves the previous value in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub instrument: Instrument,
    /// Quote at [`Timeframe::BASE`].
    pub quote: Option<Quote>,
    /// One signal per timeframe; missing keys are unknown.
    pub signals: BTreeMap<Timeframe, Signal>,
}

impl Row {
    /// A row with every field unknown.
    pub fn unknown(instrument: Instrument) -> Self {
        Self {
            instrument,
            quote: None,
            signals: BTreeMap::new(),
        }
    }

    /// Key in the snapshot table.
    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    pub fn signal(&self, timeframe: Timeframe) -> Option<Signal> {
        self.signals.get(&timeframe).copied()
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_signal(mut self, timeframe: Timeframe, signal: Signal) -> Self {
        self.signals.insert(timeframe, signal);
        self
    }

    /// True when no field holds a value.
    pub fn is_unknown(&self) -> bool {
        self.quote.is_none() && self.signals.is_empty()
    }

    /// Field-by-field update: every field known in `update` replaces this
    /// row's value, every field unknown in `update` is left untouched.
    pub fn merge(&mut self, update: &Row) {
        if let Some(quote) = update.quote {
            self.quote = Some(quote);
        }
        for (timeframe, signal) in &update.signals {
            self.signals.insert(*timeframe, *signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument() -> Instrument {
        Instrument::new("TCS", "NSE")
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut row = Row::unknown(instrument())
            .with_quote(Quote::untimed(100.0, 101.0, 99.0, 100.5, 10.0))
            .with_signal(Timeframe::Hour1, Signal::Sell)
            .with_signal(Timeframe::Daily, Signal::Buy);

        let update = Row::unknown(instrument()).with_signal(Timeframe::Daily, Signal::StrongBuy);
        row.merge(&update);

        assert_eq!(row.quote.unwrap().open, 100.0);
        assert_eq!(row.signal(Timeframe::Hour1), Some(Signal::Sell));
        assert_eq!(row.signal(Timeframe::Daily), Some(Signal::StrongBuy));
        assert_eq!(row.signal(Timeframe::Minute1), None);
    }

    #[test]
    fn test_unknown_row() {
        let row = Row::unknown(instrument());
        assert!(row.is_unknown());
        assert!(!row.with_signal(Timeframe::Minute1, Signal::Neutral).is_unknown());
    }
}
