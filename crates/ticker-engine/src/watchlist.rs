use ticker_core::types::{Instrument, Snapshot};
use tracing::info;

/// Pick the instruments to refresh at startup.
///
/// An explicit override wins. Otherwise the keys of a non-empty persisted
/// snapshot are used, in table order, falling back to the configured list.
pub fn resolve_watchlist(
    snapshot: &Snapshot,
    configured: &[String],
    overridden: Option<&[String]>,
    exchange: &str,
) -> Vec<Instrument> {
    if let Some(symbols) = overridden.filter(|s| !s.is_empty()) {
        let list = Instrument::watchlist(symbols, exchange);
        info!(count = list.len(), "watch list from command line");
        return list;
    }

    if !snapshot.is_empty() {
        let list = Instrument::watchlist(snapshot.iter().map(|r| r.symbol()), exchange);
        info!(count = list.len(), "watch list from snapshot");
        return list;
    }

    let list = Instrument::watchlist(configured, exchange);
    info!(count = list.len(), "watch list from configuration");
    list
}
