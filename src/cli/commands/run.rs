//! Headless refresh loop.

use anyhow::{bail, Result};
use ticker_engine::stop_channel;
use tracing::info;

use crate::cli::RunArgs;
use crate::context::Context;

pub async fn run(args: RunArgs, ctx: Context) -> Result<()> {
    let snapshot = ctx.store.load_or_default();
    let mut scheduler = ctx.scheduler(snapshot, &args.symbols);
    if scheduler.watchlist().is_empty() {
        bail!("Watch list is empty; add symbols to the configuration or pass --symbols");
    }

    let (handle, mut stop) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current instrument");
            handle.stop();
        }
    });

    info!(
        path = %ctx.store.path().display(),
        instruments = scheduler.watchlist().len(),
        "starting refresher"
    );

    if args.once {
        let report = scheduler.run_cycle(&mut stop).await;
        println!(
            "Cycle {}: {} updated, {} failed, {} not saved",
            report.cycle, report.updated, report.total_failures, report.commit_failures
        );
        return Ok(());
    }

    let rows = scheduler.run(stop).await;
    info!(rows = rows.len(), "refresher stopped");
    Ok(())
}
