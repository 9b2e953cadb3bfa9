//! Per-instrument refresh: fetch, then merge into the previous row.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use ticker_core::error::DataError;
use ticker_core::traits::{QuoteProvider, SignalProvider};
use ticker_core::types::{Instrument, Quote, Row, Signal, Timeframe};
use tracing::{debug, warn};

/// Row field a provider call was meant to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Quote,
    Signal(Timeframe),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Quote => write!(f, "quote"),
            Field::Signal(tf) => write!(f, "signal {}", tf),
        }
    }
}

/// A provider call that failed; the field keeps its previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub field: Field,
    pub error: DataError,
}

/// Result of refreshing one instrument.
#[derive(Debug, Clone)]
pub struct Refresh {
    /// Merged row. Sentinel-only when every call failed.
    pub row: Row,
    pub failures: Vec<FetchFailure>,
    calls: usize,
}

impl Refresh {
    /// Every provider call failed; the row must not be committed.
    pub fn is_total_failure(&self) -> bool {
        self.failures.len() >= self.calls
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && !self.is_total_failure()
    }
}

/// Calls the quote and signal providers for one instrument and merges the
/// results into its row.
pub struct RefreshEngine {
    quotes: Arc<dyn QuoteProvider>,
    signals: Arc<dyn SignalProvider>,
    call_timeout: Duration,
}

impl RefreshEngine {
    /// Create an engine. Every provider call is bounded by `call_timeout`.
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        signals: Arc<dyn SignalProvider>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            quotes,
            signals,
            call_timeout,
        }
    }

    /// Refresh one instrument.
    ///
    /// The quote is fetched once at [`Timeframe::BASE`], then one signal per
    /// timeframe in [`Timeframe::ALL`]. Calls are independent: a failure only
    /// leaves its own field at the value from `previous` (or unknown). Never
    /// fails as a whole; check [`Refresh::is_total_failure`].
    pub async fn refresh(&self, instrument: &Instrument, previous: Option<&Row>) -> Refresh {
        let mut update = Row::unknown(instrument.clone());
        let mut failures = Vec::new();

        match self.fetch_quote(instrument).await {
            Ok(quote) => update.quote = Some(quote),
            Err(error) => {
                warn!(instrument = %instrument, provider = self.quotes.name(), %error, "quote fetch failed, keeping previous value");
                failures.push(FetchFailure {
                    field: Field::Quote,
                    error,
                });
            }
        }

        for timeframe in Timeframe::ALL {
            match self.fetch_signal(instrument, timeframe).await {
                Ok(signal) => {
                    update.signals.insert(timeframe, signal);
                }
                Err(error) => {
                    warn!(
                        instrument = %instrument,
                        provider = self.signals.name(),
                        %timeframe,
                        %error,
                        "signal fetch failed, keeping previous value"
                    );
                    failures.push(FetchFailure {
                        field: Field::Signal(timeframe),
                        error,
                    });
                }
            }
        }

        let calls = 1 + Timeframe::ALL.len();
        if failures.len() >= calls {
            return Refresh {
                row: Row::unknown(instrument.clone()),
                failures,
                calls,
            };
        }

        let mut row = previous
            .cloned()
            .unwrap_or_else(|| Row::unknown(instrument.clone()));
        row.instrument = instrument.clone();
        row.merge(&update);

        debug!(instrument = %instrument, failed = failures.len(), "refreshed row");
        Refresh {
            row,
            failures,
            calls,
        }
    }

    async fn fetch_quote(&self, instrument: &Instrument) -> Result<Quote, DataError> {
        let bars = tokio::time::timeout(
            self.call_timeout,
            self.quotes.latest_bars(instrument, Timeframe::BASE, 1),
        )
        .await
        .map_err(|_| self.timeout_error())??;

        bars.last()
            .copied()
            .ok_or_else(|| DataError::NoDataAvailable(instrument.qualified()))
    }

    async fn fetch_signal(&self, instrument: &Instrument, timeframe: Timeframe) -> Result<Signal, DataError> {
        tokio::time::timeout(self.call_timeout, self.signals.recommendation(instrument, timeframe))
            .await
            .map_err(|_| self.timeout_error())?
    }

    fn timeout_error(&self) -> DataError {
        DataError::Timeout(u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX))
    }
}
