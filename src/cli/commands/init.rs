//! Write a default configuration file.

use anyhow::{bail, Result};
use std::path::Path;
use ticker_config::AppConfig;

use crate::cli::InitArgs;

pub fn run(args: &InitArgs, config_path: &Path) -> Result<()> {
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let text = toml::to_string_pretty(&AppConfig::default())?;
    std::fs::write(config_path, text)?;

    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}
