//! Wiring shared by the commands: store, provider client and engine.

use anyhow::{Context as _, Result};
use std::sync::Arc;
use ticker_config::AppConfig;
use ticker_core::types::Snapshot;
use ticker_data::{TradingViewClient, TradingViewConfig};
use ticker_engine::{resolve_watchlist, RefreshEngine, Scheduler, SchedulerConfig};
use ticker_store::SnapshotStore;

pub struct Context {
    pub config: AppConfig,
    pub store: SnapshotStore,
    pub engine: Arc<RefreshEngine>,
}

impl Context {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = SnapshotStore::new(config.store.path.clone(), config.watchlist.exchange.clone())
            .with_retry(config.store.retry_policy());

        let client = Arc::new(TradingViewClient::new(TradingViewConfig {
            base_url: config.provider.base_url.clone(),
            screener: config.watchlist.screener.clone(),
            user_agent: config.provider.user_agent.clone(),
            timeout: config.schedule.provider_timeout(),
        })
        .context("Failed to create market data client")?);
        let engine = Arc::new(RefreshEngine::new(
            client.clone(),
            client,
            config.schedule.provider_timeout(),
        ));

        Ok(Self {
            config,
            store,
            engine,
        })
    }

    /// Scheduler seeded with `snapshot`. Non-empty `symbols` replace the
    /// watch list taken from the snapshot or the configuration.
    pub fn scheduler(&self, snapshot: Snapshot, symbols: &[String]) -> Scheduler {
        let watchlist = resolve_watchlist(
            &snapshot,
            &self.config.watchlist.symbols,
            Some(symbols),
            &self.config.watchlist.exchange,
        );
        let config = SchedulerConfig {
            cycle_period: self.config.schedule.cycle_period(),
            instrument_delay: self.config.schedule.instrument_delay(),
        };

        Scheduler::new(Arc::clone(&self.engine), self.store.clone(), config)
            .with_watchlist(watchlist)
            .with_snapshot(snapshot)
    }
}
