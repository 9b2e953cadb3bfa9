//! Market data provider trait definitions.

use crate::error::DataError;
use crate::types::{Instrument, Quote, Signal, Timeframe};
use async_trait::async_trait;

/// Source of OHLCV bars.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the latest bars.
    ///
    /// # Arguments
    /// * `instrument` - The instrument to fetch
    /// * `timeframe` - The bar timeframe
    /// * `count` - Maximum number of bars, newest last
    ///
    /// # Returns
    /// Up to `count` bars ordered from oldest to newest
    async fn latest_bars(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Quote>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Source of technical-analysis recommendations.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Fetch the recommendation for one instrument at one timeframe.
    async fn recommendation(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
    ) -> Result<Signal, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
