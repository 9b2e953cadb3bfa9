//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ticker")]
#[command(author, version, about = "Periodic market data refresher with a crash-safe snapshot table")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "TICKER_CONFIG")]
    pub config: PathBuf,

    /// Log level (defaults to the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the watch list every cycle until Ctrl-C
    Run(RunArgs),
    /// Refresh in the background and show the table in the terminal
    Watch(WatchArgs),
    /// Refresh a single symbol once and save it
    Fetch(FetchArgs),
    /// Print the saved table
    Show,
    /// Validate configuration
    ValidateConfig,
    /// Write a configuration file with default settings
    InitConfig(InitArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Symbols to refresh (comma-separated), instead of the saved table's
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Symbols to refresh (comma-separated), instead of the saved table's
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Screen redraw interval in milliseconds
    #[arg(long, default_value = "250")]
    pub refresh_ms: u64,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Symbol to fetch, e.g. RELIANCE
    #[arg(short, long)]
    pub symbol: String,
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
