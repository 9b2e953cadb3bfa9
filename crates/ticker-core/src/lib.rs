//! Core types and traits for the ticker refresher.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Instrument, Timeframe, Quote, Signal)
//! - The per-instrument Row and the ordered Snapshot table
//! - Provider traits for quotes and recommendations
//! - A bounded retry policy for transient resource contention

pub mod error;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::{DataError, StoreError, TickerError, TickerResult};
pub use retry::{Backoff, RetryPolicy};
pub use traits::*;
pub use types::*;
