//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use keyhole_core::providers::ProviderKind;

use crate::logging::{self, LogTarget};

mod commands;

#[derive(Parser)]
#[command(name = "keyhole")]
#[command(version)]
#[command(about = "Sign in or create an account with Firebase Authentication")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Auth provider to use, overriding the config (firebase, memory)
    #[arg(long, value_name = "PROVIDER", value_parser = parse_provider)]
    provider: Option<ProviderKind>,

    /// Write logs to stderr (commands other than the interactive screen)
    #[arg(long, global = true)]
    log_stderr: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let target = match (&cli.command, cli.log_stderr) {
        (None, _) => LogTarget::File,
        (Some(_), true) => LogTarget::Stderr,
        (Some(_), false) => LogTarget::Off,
    };
    let _log_guard = logging::init(target)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        provider,
        log_stderr: _,
    } = cli;

    // default to the interactive screen
    let Some(command) = command else {
        return commands::tui::run(provider).await;
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
