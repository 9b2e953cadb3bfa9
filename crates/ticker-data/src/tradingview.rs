//! TradingView scanner client.
//!
//! One POST to `{base_url}/{screener}/scan` returns the requested columns for
//! a ticker. Quotes use the `open|high|low|close|volume` columns and signals
//! use the aggregate `Recommend.All` score, each suffixed with the interval.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use ticker_core::error::DataError;
use ticker_core::traits::{QuoteProvider, SignalProvider};
use ticker_core::types::{Instrument, Quote, Signal, Timeframe};
use tracing::debug;

const QUOTE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];
const RECOMMEND_COLUMN: &str = "Recommend.All";

/// Scanner connection settings.
#[derive(Debug, Clone)]
pub struct TradingViewConfig {
    pub base_url: String,
    /// Market screener, e.g. `india` for NSE listings.
    pub screener: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for TradingViewConfig {
    fn default() -> Self {
        Self {
            base_url: "https://scanner.tradingview.com".to_string(),
            screener: "india".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanRequest {
    symbols: ScanSymbols,
    columns: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScanSymbols {
    tickers: Vec<String>,
    query: ScanQuery,
}

#[derive(Debug, Serialize)]
struct ScanQuery {
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    s: String,
    d: Vec<Value>,
}

/// TradingView scanner client; serves both quotes and recommendations.
pub struct TradingViewClient {
    config: TradingViewConfig,
    client: Client,
}

impl TradingViewClient {
    /// Create a new scanner client.
    pub fn new(config: TradingViewConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DataError::ConnectionError(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn scan_url(&self) -> String {
        format!(
            "{}/{}/scan",
            self.config.base_url.trim_end_matches('/'),
            self.config.screener
        )
    }

    /// Fetch numeric columns for one instrument, in request order.
    async fn scan(&self, instrument: &Instrument, columns: Vec<String>) -> Result<Vec<Option<f64>>, DataError> {
        let ticker = instrument.qualified();
        let request = ScanRequest {
            symbols: ScanSymbols {
                tickers: vec![ticker.clone()],
                query: ScanQuery { types: vec![] },
            },
            columns,
        };

        debug!(ticker = %ticker, columns = ?request.columns, "scanner request");

        let resp = self
            .client
            .post(self.scan_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DataError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    DataError::ConnectionError(e.to_string())
                }
            })?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DataError::ApiError(format!("{}: {}", status, text)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        parse_scan(&body, &ticker, request.columns.len())
    }
}

#[async_trait]
impl QuoteProvider for TradingViewClient {
    async fn latest_bars(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Quote>, DataError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let values = self.scan(instrument, quote_columns(timeframe)).await?;
        let quote = quote_from_values(&values, bar_start(Utc::now(), timeframe))
            .ok_or_else(|| DataError::NoDataAvailable(instrument.qualified()))?;
        // The scanner only exposes the current bar.
        Ok(vec![quote])
    }

    fn name(&self) -> &str {
        "TradingView"
    }
}

#[async_trait]
impl SignalProvider for TradingViewClient {
    async fn recommendation(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
    ) -> Result<Signal, DataError> {
        let values = self.scan(instrument, vec![recommend_column(timeframe)]).await?;
        let score = values
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| DataError::NoDataAvailable(instrument.qualified()))?;
        Signal::from_score(score)
            .ok_or_else(|| DataError::ParseError(format!("recommendation score out of range: {}", score)))
    }

    fn name(&self) -> &str {
        "TradingView"
    }
}

/// Column suffix selecting the interval; daily columns carry none.
fn interval_suffix(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute1 => "|1",
        Timeframe::Minute15 => "|15",
        Timeframe::Hour1 => "|60",
        Timeframe::Daily => "",
    }
}

fn quote_columns(timeframe: Timeframe) -> Vec<String> {
    QUOTE_COLUMNS
        .iter()
        .map(|c| format!("{}{}", c, interval_suffix(timeframe)))
        .collect()
}

fn recommend_column(timeframe: Timeframe) -> String {
    format!("{}{}", RECOMMEND_COLUMN, interval_suffix(timeframe))
}

/// Start of the bar containing `now`, on UTC boundaries.
fn bar_start(now: DateTime<Utc>, timeframe: Timeframe) -> DateTime<Utc> {
    let secs = timeframe.as_secs() as i64;
    let start = now.timestamp() - now.timestamp().rem_euclid(secs);
    DateTime::from_timestamp(start, 0).unwrap_or(now)
}

fn parse_scan(body: &str, ticker: &str, columns: usize) -> Result<Vec<Option<f64>>, DataError> {
    let response: ScanResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    let row = response
        .data
        .into_iter()
        .find(|r| r.s.eq_ignore_ascii_case(ticker))
        .ok_or_else(|| DataError::SymbolNotFound(ticker.to_string()))?;

    if row.d.len() != columns {
        return Err(DataError::ParseError(format!(
            "expected {} columns for {}, got {}",
            columns,
            ticker,
            row.d.len()
        )));
    }

    Ok(row.d.iter().map(Value::as_f64).collect())
}

fn quote_from_values(values: &[Option<f64>], timestamp: DateTime<Utc>) -> Option<Quote> {
    match values {
        [Some(open), Some(high), Some(low), Some(close), Some(volume)] => {
            Some(Quote::new(timestamp, *open, *high, *low, *close, *volume))
        }
        _ => None,
    }
}
