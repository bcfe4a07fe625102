//! Log subscriber setup.
//!
//! The TUI owns stdout, so interactive runs log to
//! `$KEYHOLE_HOME/logs/keyhole.log`. Other commands log to stderr when asked
//! and stay silent otherwise. The filter comes from `KEYHOLE_LOG`.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use keyhole_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "KEYHOLE_LOG";

const LOG_FILE: &str = "keyhole.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
    Off,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init(target: LogTarget) -> Result<Option<WorkerGuard>> {
    match target {
        LogTarget::Off => Ok(None),
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(io::stderr))
                .try_init()
                .ok();
            Ok(None)
        }
        LogTarget::File => {
            let dir = paths::logs_dir();
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .ok();
            Ok(Some(guard))
        }
    }
}
