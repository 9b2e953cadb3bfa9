//! Market data refresher CLI application.

mod cli;
mod context;

use anyhow::{Context as _, Result};
use clap::Parser;
use cli::{Cli, Commands};
use context::Context;
use std::path::PathBuf;
use ticker_config::load_config;
use ticker_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that work on the configuration file itself
    match &cli.command {
        Commands::InitConfig(args) => return cli::commands::init::run(args, &cli.config),
        Commands::ValidateConfig => return cli::commands::validate::run(&cli.config),
        _ => {}
    }

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    config.validate()?;

    // Setup logging. The table view owns the terminal, so its logs go to a file.
    let log_level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let log_file = match (&config.logging.file, &cli.command) {
        (Some(file), _) => Some(PathBuf::from(file)),
        (None, Commands::Watch(_)) => Some(PathBuf::from("ticker.log")),
        (None, _) => None,
    };
    let _guard = setup_logging(
        &log_level,
        cli.json_logs || config.logging.is_json(),
        log_file.as_deref(),
    );

    let ctx = Context::new(config)?;

    // Execute command
    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, ctx).await,
        Commands::Watch(args) => cli::commands::watch::run(args, ctx).await,
        Commands::Fetch(args) => cli::commands::fetch::run(args, ctx).await,
        Commands::Show => cli::commands::show::run(ctx),
        Commands::ValidateConfig | Commands::InitConfig(_) => Ok(()),
    }
}
