//! One-shot refresh of a single symbol.

use anyhow::{bail, Context as _, Result};
use ticker_core::types::Instrument;

use super::format_rows;
use crate::cli::FetchArgs;
use crate::context::Context;

pub async fn run(args: FetchArgs, ctx: Context) -> Result<()> {
    let instrument = Instrument::new(&args.symbol, &ctx.config.watchlist.exchange);
    if instrument.symbol.is_empty() {
        bail!("Symbol must not be empty");
    }

    let snapshot = ctx.store.load().context("Failed to read saved table")?;
    let refresh = ctx
        .engine
        .refresh(&instrument, snapshot.get(&instrument.symbol))
        .await;

    if refresh.is_total_failure() {
        bail!("No data fetched for {}", instrument.symbol);
    }
    for failure in &refresh.failures {
        println!("Warning: {} unavailable: {}", failure.field, failure.error);
    }

    ctx.store
        .upsert(&refresh.row)
        .await
        .context("Failed to save row")?;
    print!("{}", format_rows([&refresh.row]));
    println!("Saved to {}", ctx.store.path().display());
    Ok(())
}
