//! Credential form controller.
//!
//! Holds the unsaved email/password/mode input and turns a submit into the
//! matching provider call. The session is never touched here: a successful
//! call shows up later through the session observer.

use std::fmt;

use crate::providers::{AuthProvider, ProviderError};

/// Minimum password length suggested to the user. Advisory only.
pub const PASSWORD_HINT_LEN: usize = 6;

/// Whether the form creates an account or signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggle(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    /// Form title, also used as the submit label.
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Log in",
            AuthMode::SignUp => "Sign up",
        }
    }

    /// Label of the control that flips the mode.
    pub fn switch_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Switch to sign up",
            AuthMode::SignUp => "Switch to log in",
        }
    }
}

/// Transient form input. Never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialDraft {
    pub email: String,
    pub password: String,
    pub mode: AuthMode,
}

impl fmt::Debug for CredentialDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDraft")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("mode", &self.mode)
            .finish()
    }
}

impl CredentialDraft {
    pub fn update_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn update_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
    }

    /// Flips between sign-in and sign-up. Entered values are kept.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
    }

    /// Back to an empty sign-in form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks the fields a browser would enforce with `required`.
    ///
    /// # Errors
    /// Returns the first empty field.
    pub fn check_required(&self) -> Result<(), MissingField> {
        if self.email.trim().is_empty() {
            return Err(MissingField::Email);
        }
        if self.password.is_empty() {
            return Err(MissingField::Password);
        }
        Ok(())
    }
}

/// A required field left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Email,
    Password,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Email => f.write_str("Please enter your email address."),
            MissingField::Password => f.write_str("Please enter your password."),
        }
    }
}

impl std::error::Error for MissingField {}

/// Successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    AccountCreated,
    SignedIn,
}

/// Submits the draft to the provider.
///
/// Dispatches to `create_account` in sign-up mode and to `sign_in`
/// otherwise.
///
/// # Errors
/// Returns the provider's error unchanged.
pub async fn submit(
    provider: &dyn AuthProvider,
    draft: &CredentialDraft,
) -> Result<SubmitOutcome, ProviderError> {
    tracing::info!(email = %draft.email, mode = ?draft.mode, provider = provider.name(), "submitting credentials");
    let result = match draft.mode {
        AuthMode::SignUp => provider
            .create_account(&draft.email, &draft.password)
            .await
            .map(|()| SubmitOutcome::AccountCreated),
        AuthMode::SignIn => provider
            .sign_in(&draft.email, &draft.password)
            .await
            .map(|()| SubmitOutcome::SignedIn),
    };
    if let Err(err) = &result {
        tracing::warn!(email = %draft.email, kind = ?err.kind, "credential submit rejected");
    }
    result
}

/// User-facing notification produced by a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Sign-up succeeded.
    AccountCreated,
    /// The provider rejected the call; carries its message verbatim.
    Error(String),
}

impl Notice {
    /// Notice to show for a submit result. A plain sign-in shows none.
    pub fn from_submit(result: &Result<SubmitOutcome, ProviderError>) -> Option<Self> {
        match result {
            Ok(SubmitOutcome::AccountCreated) => Some(Notice::AccountCreated),
            Ok(SubmitOutcome::SignedIn) => None,
            Err(err) => Some(Notice::Error(err.message.clone())),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn text(&self) -> String {
        match self {
            Notice::AccountCreated => "Account created!".to_string(),
            Notice::Error(message) => format!("Error: {message}"),
        }
    }
}
