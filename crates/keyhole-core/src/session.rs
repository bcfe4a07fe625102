//! Session observation.
//!
//! `SessionState` is the local picture of who is signed in. It is only ever
//! changed by notifications from the provider; credential calls never touch
//! it. `Loading` exists only until the first notification arrives.

use crate::providers::{AuthProvider, Identity, Subscription};

/// Local session state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No notification received yet.
    #[default]
    Loading,
    /// A user is signed in.
    Authenticated(Identity),
    /// Nobody is signed in.
    Unauthenticated,
}

/// How a notification moved the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// Went from loading or signed out to signed in.
    SignedIn,
    /// Went from loading or signed in to signed out.
    SignedOut,
    /// Signed in before and after, as a different user.
    Switched,
    /// Same state as before.
    Unchanged,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Loading | SessionState::Unauthenticated => None,
        }
    }

    /// Applies a provider notification. Never returns to `Loading`.
    pub fn apply(&mut self, reported: Option<Identity>) -> SessionChange {
        let change = match (&*self, &reported) {
            (SessionState::Authenticated(old), Some(new)) if old == new => SessionChange::Unchanged,
            (SessionState::Authenticated(_), Some(_)) => SessionChange::Switched,
            (SessionState::Loading | SessionState::Unauthenticated, Some(_)) => {
                SessionChange::SignedIn
            }
            (SessionState::Unauthenticated, None) => SessionChange::Unchanged,
            (SessionState::Loading | SessionState::Authenticated(_), None) => {
                SessionChange::SignedOut
            }
        };

        *self = match reported {
            Some(identity) => SessionState::Authenticated(identity),
            None => SessionState::Unauthenticated,
        };
        change
    }
}

/// Scoped subscription to a provider's session notifications.
///
/// Every notification is forwarded to the sink given to `attach`. The
/// subscription is released when the observer is dropped, on every exit
/// path including unwinding.
#[derive(Debug)]
pub struct SessionObserver {
    subscription: Subscription,
}

impl SessionObserver {
    /// Subscribes to `provider`, forwarding notifications to `sink`.
    ///
    /// The sink runs on whichever thread the provider publishes from and
    /// receives the current identity once immediately.
    pub fn attach<F>(provider: &dyn AuthProvider, sink: F) -> Self
    where
        F: Fn(Option<Identity>) + Send + Sync + 'static,
    {
        tracing::debug!(provider = provider.name(), "attaching session observer");
        Self {
            subscription: provider.subscribe(Box::new(sink)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Releases the subscription now.
    pub fn detach(self) {
        tracing::debug!("detaching session observer");
        self.subscription.unsubscribe();
    }
}
