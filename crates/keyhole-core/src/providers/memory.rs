//! In-process auth provider.
//!
//! Accounts live in a map for the lifetime of the process. Rules mirror the
//! hosted backend closely enough for tests and offline demos:
//! - passwords shorter than `MIN_PASSWORD_LEN` are rejected as weak
//! - creating an account signs it in
//! - a wrong password and an unknown email fail the same way

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use futures_util::future::{BoxFuture, FutureExt};

use super::{
    AuthProvider, Identity, ListenerRegistry, ProviderError, ProviderErrorKind, ProviderResult,
    SessionListener, Subscription,
};

/// Minimum password length accepted on account creation.
pub const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    password: String,
}

/// Auth provider backed by an in-memory account table.
#[derive(Default)]
pub struct MemoryAuth {
    registry: ListenerRegistry,
    accounts: Mutex<HashMap<String, Account>>,
    next_uid: AtomicU64,
    offline: AtomicBool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account without signing it in.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.insert_account(email, password);
        self
    }

    /// Adds an account and starts signed in as it.
    pub fn signed_in_as(self, email: &str, password: &str) -> Self {
        let identity = self.insert_account(email, password);
        self.registry.publish(Some(identity));
        self
    }

    /// While offline every credential call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Identity currently signed in, if any.
    pub fn current(&self) -> Option<Identity> {
        self.registry.current()
    }

    /// Number of live session subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.listener_count()
    }

    fn new_account(&self, password: &str) -> Account {
        Account {
            uid: format!("mem-{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1),
            password: password.to_string(),
        }
    }

    fn insert_account(&self, email: &str, password: &str) -> Identity {
        let account = self.new_account(password);
        let identity = Identity::new(account.uid.clone(), email);
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email.to_string(), account);
        identity
    }

    fn check_online(&self) -> ProviderResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::network(
                "Firebase: Error (auth/network-request-failed).",
            ));
        }
        Ok(())
    }

    fn do_sign_in(&self, email: &str, password: &str) -> ProviderResult<()> {
        self.check_online()?;
        let identity = {
            let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            match accounts.get(email) {
                Some(account) if account.password == password => {
                    Identity::new(account.uid.clone(), email)
                }
                _ => {
                    return Err(ProviderError::new(
                        ProviderErrorKind::InvalidCredentials,
                        "Firebase: Error (auth/invalid-credential).",
                    ));
                }
            }
        };
        tracing::info!(email, "memory provider signed in");
        self.registry.publish(Some(identity));
        Ok(())
    }

    fn do_create_account(&self, email: &str, password: &str) -> ProviderResult<()> {
        self.check_online()?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(
                ProviderErrorKind::WeakPassword,
                "Firebase: Password should be at least 6 characters (auth/weak-password).",
            ));
        }
        let identity = {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            match accounts.entry(email.to_string()) {
                Entry::Occupied(_) => {
                    return Err(ProviderError::new(
                        ProviderErrorKind::EmailInUse,
                        "Firebase: Error (auth/email-already-in-use).",
                    ));
                }
                Entry::Vacant(slot) => {
                    let account = slot.insert(self.new_account(password));
                    Identity::new(account.uid.clone(), email)
                }
            }
        };
        tracing::info!(email, "memory provider created account");
        self.registry.publish(Some(identity));
        Ok(())
    }
}

impl AuthProvider for MemoryAuth {
    fn name(&self) -> &str {
        "memory"
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.registry.subscribe(listener)
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        async move { self.do_sign_in(email, password) }.boxed()
    }

    fn create_account<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        async move { self.do_create_account(email, password) }.boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, ProviderResult<()>> {
        async move {
            self.registry.publish(None);
            tracing::info!("memory provider signed out");
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, mpsc};

    use super::*;

    fn record(provider: &MemoryAuth) -> (Subscription, mpsc::Receiver<Option<Identity>>) {
        let (tx, rx) = mpsc::channel();
        let sub = provider.subscribe(Box::new(move |identity| {
            let _ = tx.send(identity);
        }));
        (sub, rx)
    }

    #[tokio::test]
    async fn test_create_account_signs_in() {
        let provider = MemoryAuth::new();
        let (_sub, rx) = record(&provider);

        provider.create_account("a@b.com", "secret1").await.unwrap();

        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], None);
        assert_eq!(seen[1].as_ref().map(|i| i.email.as_str()), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_create_account_rejects_short_password() {
        let provider = MemoryAuth::new();

        let err = provider.create_account("a@b.com", "12345").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::WeakPassword);
        assert!(provider.current().is_none());
    }

    #[tokio::test]
    async fn test_create_account_rejects_existing_email() {
        let provider = MemoryAuth::new().with_account("a@b.com", "secret1");

        let err = provider.create_account("a@b.com", "secret2").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::EmailInUse);
        assert!(err.message.contains("auth/email-already-in-use"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ups_for_one_email_admit_one() {
        let provider = Arc::new(MemoryAuth::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move {
                    let password = format!("secret{n}");
                    let result = provider.create_account("a@b.com", &password).await;
                    result.map(|()| password)
                })
            })
            .collect();
        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(password) => winners.push(password),
                Err(err) => assert_eq!(err.kind, ProviderErrorKind::EmailInUse),
            }
        }

        assert_eq!(winners.len(), 1);
        provider.sign_out().await.unwrap();
        provider.sign_in("a@b.com", &winners[0]).await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let provider = MemoryAuth::new().with_account("a@b.com", "secret1");
        let (_sub, rx) = record(&provider);

        let err = provider.sign_in("a@b.com", "nope").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::InvalidCredentials);
        // Only the initial replay; a failed sign-in publishes nothing.
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out() {
        let provider = MemoryAuth::new().with_account("a@b.com", "secret1");
        let (_sub, rx) = record(&provider);

        provider.sign_in("a@b.com", "secret1").await.unwrap();
        provider.sign_out().await.unwrap();

        let seen: Vec<_> = rx.try_iter().map(|i| i.map(|i| i.email)).collect();
        assert_eq!(seen, vec![None, Some("a@b.com".to_string()), None]);
    }

    #[tokio::test]
    async fn test_offline_fails_with_network_error() {
        let provider = MemoryAuth::new().with_account("a@b.com", "secret1");
        provider.set_offline(true);

        let err = provider.sign_in("a@b.com", "secret1").await.unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Network);
    }

    #[test]
    fn test_signed_in_as_replays_identity() {
        let provider = MemoryAuth::new().signed_in_as("a@b.com", "secret1");
        let (_sub, rx) = record(&provider);

        let first = rx.try_recv().unwrap().unwrap();
        assert_eq!(first.email, "a@b.com");
    }
}
