//! Core traits for the ticker refresher.

mod provider;

pub use provider::{QuoteProvider, SignalProvider};
