//! Effect handlers for the TUI runtime.
//!
//! Handlers are async functions that perform one provider call and return the
//! result as a `UiEvent`. The runtime spawns them and sends the event to the
//! inbox. They never touch `AppState`.

use std::sync::Arc;

use keyhole_core::form::{self, CredentialDraft};
use keyhole_core::providers::AuthProvider;

use crate::events::UiEvent;

/// Submits the credential draft.
pub async fn submit(provider: Arc<dyn AuthProvider>, draft: CredentialDraft) -> UiEvent {
    UiEvent::SubmitFinished(form::submit(provider.as_ref(), &draft).await)
}

/// Signs the current user out.
pub async fn sign_out(provider: Arc<dyn AuthProvider>) -> UiEvent {
    let result = provider.sign_out().await;
    if let Err(err) = &result {
        tracing::warn!(kind = ?err.kind, "sign-out failed");
    }
    UiEvent::SignOutFinished(result)
}
