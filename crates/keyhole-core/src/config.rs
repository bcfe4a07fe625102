//! Configuration management for keyhole.
//!
//! Loads configuration from ${KEYHOLE_HOME}/config.toml with sensible defaults.
//! The configuration is read once at startup and never written back.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for keyhole configuration and data directories.
    //!
    //! KEYHOLE_HOME resolution order:
    //! 1. KEYHOLE_HOME environment variable (if set)
    //! 2. ~/.config/keyhole (default)

    use std::path::PathBuf;

    /// Returns the user's home directory.
    pub fn home_dir() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
    }

    /// Returns the keyhole home directory.
    ///
    /// Checks KEYHOLE_HOME env var first, falls back to ~/.config/keyhole,
    /// then to `.keyhole` in the working directory when no home is known.
    pub fn keyhole_home() -> PathBuf {
        if let Some(home) = std::env::var_os("KEYHOLE_HOME").filter(|h| !h.is_empty()) {
            return PathBuf::from(home);
        }

        home_dir().map_or_else(
            || PathBuf::from(".keyhole"),
            |h| h.join(".config").join("keyhole"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        keyhole_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        keyhole_home().join("logs")
    }
}

/// Connection parameters of a Firebase project.
///
/// Only `api_key` and the endpoint matter to the auth calls; the rest is the
/// project's web config, kept so a pasted config block loads as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Web API key (empty means "use FIREBASE_API_KEY").
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    /// Identity Toolkit base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_toolkit_url: Option<String>,
    /// Request timeout in seconds (0 disables)
    pub request_timeout_secs: u64,
}

impl FirebaseConfig {
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_domain: String::new(),
            project_id: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: String::new(),
            app_id: String::new(),
            identity_toolkit_url: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Auth provider implementation
    pub provider: ProviderKind,

    /// Firebase project settings
    pub firebase: FirebaseConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}
