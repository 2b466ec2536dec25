//! Effective configuration: `seedsearch config`.

use anyhow::{Context, Result};
use std::path::Path;

pub fn cmd_config(config_path: &Path) -> Result<()> {
    use seedsearch::config::Settings;

    let settings = Settings::load(config_path)?;
    if config_path.exists() {
        println!("# Config file: {}", config_path.display());
    } else {
        println!("# Config file: {} (not found, using defaults)", config_path.display());
    }
    if let Err(e) = settings.validate() {
        println!("# {}: {}", console::style("Invalid").red().bold(), e);
    }
    println!();
    print!("{}", settings.to_toml().context("Failed to render configuration")?);
    Ok(())
}
