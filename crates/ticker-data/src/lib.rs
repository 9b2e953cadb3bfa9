//! Market data providers.

mod tradingview;

pub use tradingview::{TradingViewClient, TradingViewConfig};
