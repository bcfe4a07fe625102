//! Authentication provider capability interface.
//!
//! The UI never talks to an authentication backend directly. It holds an
//! `Arc<dyn AuthProvider>` and only ever:
//! - subscribes to session changes (`subscribe`)
//! - issues credential calls (`sign_in`, `create_account`, `sign_out`)
//!
//! Credential calls report success or a `ProviderError`. The session they
//! produce is only ever observed through the subscription.

pub mod firebase;
pub mod memory;
mod registry;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use registry::{ListenerRegistry, Subscription};

use crate::config::Config;

/// User handle reported by the provider.
///
/// Opaque to the UI: it is displayed, never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned user id.
    pub uid: String,
    /// Email address as reported by the provider.
    pub email: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Callback invoked with the current identity (`None` when signed out).
pub type SessionListener = Box<dyn Fn(Option<Identity>) + Send + Sync>;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Capability interface of an authentication provider.
///
/// Implementations own the connection to the backend, the tokens, and the
/// current identity. Listeners must not call back into the provider
/// synchronously.
pub trait AuthProvider: Send + Sync {
    /// Short name for logs and the status line.
    fn name(&self) -> &str;

    /// Registers a session listener.
    ///
    /// The listener is called once immediately with the current identity and
    /// again on every change, in emission order. Dropping the returned
    /// `Subscription` unregisters it.
    fn subscribe(&self, listener: SessionListener) -> Subscription;

    /// Signs in with email and password.
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str)
    -> BoxFuture<'a, ProviderResult<()>>;

    /// Creates an account with email and password.
    fn create_account<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Signs the current user out.
    fn sign_out(&self) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Provider error category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Wrong password or unknown account.
    InvalidCredentials,
    /// Password rejected by the backend's strength policy.
    WeakPassword,
    /// An account already exists for this email.
    EmailInUse,
    /// The backend could not be reached or answered garbage.
    Network,
    /// Anything else, keyed by the provider's error code.
    Other(String),
}

/// Error returned by a provider call.
///
/// `message` is the provider's own text and is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// Provider-supplied message
    pub message: String,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Which provider implementation to connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Firebase Authentication over the Identity Toolkit REST API.
    #[default]
    Firebase,
    /// In-process accounts, nothing leaves the machine.
    Memory,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Firebase => "firebase",
            ProviderKind::Memory => "memory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(ProviderKind::Firebase),
            "memory" => Ok(ProviderKind::Memory),
            other => anyhow::bail!("Unknown provider '{other}' (expected firebase or memory)"),
        }
    }
}

/// Builds the provider selected by `config.provider`.
///
/// This is the single place a provider connection is created; callers pass
/// the resulting handle down explicitly.
///
/// # Errors
/// Returns an error if the provider configuration is incomplete or invalid.
pub fn connect(config: &Config) -> Result<Arc<dyn AuthProvider>> {
    match config.provider {
        ProviderKind::Firebase => {
            let settings = firebase::FirebaseSettings::resolve(&config.firebase)?;
            tracing::info!(
                project_id = %settings.project_id,
                endpoint = %settings.identity_toolkit_url,
                "connecting firebase auth provider"
            );
            Ok(Arc::new(firebase::FirebaseAuth::new(settings)?))
        }
        ProviderKind::Memory => {
            tracing::info!("using in-memory auth provider");
            Ok(Arc::new(memory::MemoryAuth::new()))
        }
    }
}
