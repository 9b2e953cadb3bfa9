//! Print the saved table.

use anyhow::{Context as _, Result};

use super::format_rows;
use crate::context::Context;

pub fn run(ctx: Context) -> Result<()> {
    let snapshot = ctx.store.load().context("Failed to read saved table")?;
    if snapshot.is_empty() {
        println!("No saved data at {}", ctx.store.path().display());
        return Ok(());
    }
    print!("{}", format_rows(snapshot.rows()));
    Ok(())
}
