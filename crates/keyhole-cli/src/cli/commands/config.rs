//! Config command handlers.

use anyhow::{Context, Result};
use keyhole_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "config initialized");
    println!("Created config at {}", config_path.display());
    Ok(())
}
