//! Scripted providers for engine and scheduler tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use ticker_core::error::DataError;
use ticker_core::traits::{QuoteProvider, SignalProvider};
use ticker_core::types::{Instrument, Quote, Signal, Timeframe};
use tokio::time::Instant;

/// Serves whatever the test scripted; anything unscripted fails with
/// `SymbolNotFound`.
#[derive(Default)]
pub struct FakeProvider {
    quotes: Mutex<HashMap<String, Result<Vec<Quote>, DataError>>>,
    signals: Mutex<HashMap<(String, Timeframe), Result<Signal, DataError>>>,
    quote_calls: Mutex<Vec<(String, Instant)>>,
    latency: Duration,
    panic_on: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Panic when asked for a quote of `symbol`.
    pub fn panicking_on(mut self, symbol: &str) -> Self {
        self.panic_on = Some(symbol.to_string());
        self
    }

    pub fn set_quote(&self, symbol: &str, quote: Result<Quote, DataError>) {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), quote.map(|q| vec![q]));
    }

    pub fn set_empty_bars(&self, symbol: &str) {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Ok(Vec::new()));
    }

    pub fn set_signal(&self, symbol: &str, timeframe: Timeframe, signal: Result<Signal, DataError>) {
        self.signals
            .lock()
            .unwrap()
            .insert((symbol.to_string(), timeframe), signal);
    }

    pub fn set_all_signals(&self, symbol: &str, signal: Signal) {
        for tf in Timeframe::ALL {
            self.set_signal(symbol, tf, Ok(signal));
        }
    }

    /// Forget everything scripted for `symbol`, so all its calls fail.
    pub fn fail_all(&self, symbol: &str) {
        self.quotes.lock().unwrap().remove(symbol);
        self.signals.lock().unwrap().retain(|(s, _), _| s != symbol);
    }

    /// Instants at which quotes for `symbol` were requested.
    pub fn quote_calls(&self, symbol: &str) -> Vec<Instant> {
        self.quote_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == symbol)
            .map(|(_, t)| *t)
            .collect()
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl QuoteProvider for FakeProvider {
    async fn latest_bars(
        &self,
        instrument: &Instrument,
        _timeframe: Timeframe,
        _count: usize,
    ) -> Result<Vec<Quote>, DataError> {
        self.quote_calls
            .lock()
            .unwrap()
            .push((instrument.symbol.clone(), Instant::now()));
        if self.panic_on.as_deref() == Some(instrument.symbol.as_str()) {
            panic!("provider blew up for {}", instrument.symbol);
        }
        self.wait().await;
        let scripted = self.quotes.lock().unwrap().get(&instrument.symbol).cloned();
        scripted.unwrap_or_else(|| Err(DataError::SymbolNotFound(instrument.symbol.clone())))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[async_trait]
impl SignalProvider for FakeProvider {
    async fn recommendation(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
    ) -> Result<Signal, DataError> {
        self.wait().await;
        let scripted = self
            .signals
            .lock()
            .unwrap()
            .get(&(instrument.symbol.clone(), timeframe))
            .cloned();
        scripted.unwrap_or_else(|| Err(DataError::SymbolNotFound(instrument.symbol.clone())))
    }

    fn name(&self) -> &str {
        "fake"
    }
}
