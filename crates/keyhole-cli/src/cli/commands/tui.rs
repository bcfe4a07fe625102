//! Interactive screen handler.

use anyhow::{Context, Result};
use keyhole_core::config::Config;
use keyhole_core::providers::{self, ProviderKind};

pub async fn run(provider_override: Option<ProviderKind>) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(kind) = provider_override {
        config.provider = kind;
    }

    let provider = providers::connect(&config)
        .with_context(|| format!("connect {} auth provider", config.provider))?;
    keyhole_tui::run(provider).await
}
