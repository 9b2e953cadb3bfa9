//! Core data types for the ticker refresher.

mod instrument;
mod quote;
mod row;
mod signal;
mod snapshot;
mod timeframe;

pub use instrument::Instrument;
pub use quote::Quote;
pub use row::Row;
pub use signal::Signal;
pub use snapshot::Snapshot;
pub use timeframe::Timeframe;
