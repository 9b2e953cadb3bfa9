//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use ticker_config::load_config;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("{}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!(
        "Watch list: {} symbols on {}",
        config.watchlist.symbols.len(),
        config.watchlist.exchange
    );
    println!(
        "Cycle: {}s, {}ms between symbols",
        config.schedule.cycle_period_secs, config.schedule.instrument_delay_ms
    );
    println!("Snapshot: {}", config.store.path.display());
    println!(
        "Locked-file retry: {} attempts, {}ms apart",
        config.store.retry_attempts, config.store.retry_delay_ms
    );

    Ok(())
}
