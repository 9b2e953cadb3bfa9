//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, LoggingConfig, ProviderConfig, ScheduleConfig, StoreConfig,
    WatchlistConfig,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// A missing file is not an error: every section has defaults. Variables
/// such as `TICKER__SCHEDULE__CYCLE_PERIOD_SECS` override file values.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("TICKER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
