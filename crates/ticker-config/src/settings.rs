//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use ticker_core::error::{TickerError, TickerResult};
use ticker_core::retry::RetryPolicy;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub watchlist: WatchlistConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Reject settings the refresher cannot run with.
    pub fn validate(&self) -> TickerResult<()> {
        if self.schedule.cycle_period_secs == 0 {
            return Err(invalid("schedule.cycle_period_secs must be greater than zero"));
        }
        if self.schedule.provider_timeout_secs == 0 {
            return Err(invalid("schedule.provider_timeout_secs must be greater than zero"));
        }
        if self.store.retry_attempts == 0 {
            return Err(invalid("store.retry_attempts must be at least 1"));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(invalid("store.path must not be empty"));
        }
        if self.watchlist.exchange.trim().is_empty() {
            return Err(invalid("watchlist.exchange must not be empty"));
        }

        let mut seen = HashSet::new();
        for symbol in &self.watchlist.symbols {
            let key = symbol.trim().to_uppercase();
            if key.is_empty() {
                return Err(invalid("watchlist.symbols contains an empty symbol"));
            }
            if !seen.insert(key) {
                return Err(TickerError::Config(format!(
                    "watchlist.symbols lists {} more than once",
                    symbol.trim()
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> TickerError {
    TickerError::Config(message.to_string())
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "ticker-sync".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Instruments to track when no snapshot exists yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistConfig {
    pub exchange: String,
    /// Scanner market, e.g. `india` for NSE listings.
    pub screener: String,
    pub symbols: Vec<String>,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            exchange: "NSE".to_string(),
            screener: "india".to_string(),
            symbols: [
                "RELIANCE",
                "TCS",
                "HDFCBANK",
                "INFY",
                "SBIN",
                "ICICIBANK",
                "HINDUNILVR",
                "KOTAKBANK",
                "LT",
                "BAJFINANCE",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Loop pacing and provider call bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub cycle_period_secs: u64,
    pub instrument_delay_ms: u64,
    pub provider_timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cycle_period_secs: 60,
            instrument_delay_ms: 1000,
            provider_timeout_secs: 10,
        }
    }
}

impl ScheduleConfig {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_period_secs)
    }

    pub fn instrument_delay(&self) -> Duration {
        Duration::from_millis(self.instrument_delay_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

/// Snapshot table location and locked-file retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stock_data.csv"),
            retry_attempts: 5,
            retry_delay_ms: 2000,
        }
    }
}

impl StoreConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Market data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scanner.tradingview.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}
