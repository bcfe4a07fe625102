//! Full-screen TUI for keyhole.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::Result;
pub use features::{form, members};
use keyhole_core::providers::AuthProvider;
pub use runtime::TuiRuntime;

/// Runs the interactive sign-in screen against `provider` until the user quits.
///
/// Must be called from within a tokio runtime; provider calls are spawned on it.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the terminal cannot be set up.
pub async fn run(provider: Arc<dyn AuthProvider>) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "keyhole requires a terminal.\n\
             Run it from an interactive shell, or use `keyhole config path` to locate the config."
        );
    }

    tracing::info!(provider = provider.name(), "starting tui");
    let mut runtime = TuiRuntime::new(provider)?;
    let result = runtime.run();
    drop(runtime);
    tracing::info!("tui exited");
    result
}
