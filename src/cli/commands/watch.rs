//! Background refresh with the table view in the foreground.

use anyhow::{bail, Result};
use ticker_engine::stop_channel;
use ticker_monitor::{Dashboard, DashboardState};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::WatchArgs;
use crate::context::Context;

pub async fn run(args: WatchArgs, ctx: Context) -> Result<()> {
    let snapshot = ctx.store.load_or_default();
    let (updates_tx, mut updates_rx) = mpsc::channel(256);
    let scheduler = ctx
        .scheduler(snapshot.clone(), &args.symbols)
        .with_updates(updates_tx);
    if scheduler.watchlist().is_empty() {
        bail!("Watch list is empty; add symbols to the configuration or pass --symbols");
    }

    let mut state = DashboardState::seeded(snapshot, scheduler.watchlist());
    let status = scheduler.status();
    let (handle, stop) = stop_channel();
    let refresher = tokio::spawn(scheduler.run(stop));

    let dashboard = Dashboard::new(args.refresh_ms);
    let ui = tokio::task::spawn_blocking(move || {
        dashboard.run(move || {
            while let Ok(update) = updates_rx.try_recv() {
                state.apply(update);
            }
            state.status = Some(status.borrow().clone());
            state.clone()
        })
    })
    .await;

    handle.stop();
    println!("Stopping after the current refresh...");
    let rows = refresher.await?;
    info!(rows = rows.len(), "refresher stopped");

    ui??;
    Ok(())
}
