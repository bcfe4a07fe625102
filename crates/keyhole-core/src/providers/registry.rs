//! Session listener bookkeeping shared by provider implementations.
//!
//! Holds the current identity and the registered listeners. Publishing is
//! serialized so every listener sees identities in emission order, and a new
//! subscriber's initial replay cannot interleave with a publish.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{Identity, SessionListener};

type SharedListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

#[derive(Default)]
struct Table {
    current: Option<Identity>,
    next_id: u64,
    listeners: BTreeMap<u64, SharedListener>,
}

#[derive(Default)]
struct Shared {
    table: Mutex<Table>,
    /// Held for the duration of a fan-out.
    emit: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current identity plus listener table.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    shared: Arc<Shared>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that starts with a signed-in identity.
    pub fn with_identity(identity: Identity) -> Self {
        let registry = Self::default();
        lock(&registry.shared.table).current = Some(identity);
        registry
    }

    /// Returns the identity most recently published.
    pub fn current(&self) -> Option<Identity> {
        lock(&self.shared.table).current.clone()
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        lock(&self.shared.table).listeners.len()
    }

    /// Registers `listener` and replays the current identity to it.
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let _emit = lock(&self.shared.emit);
        let listener: SharedListener = Arc::from(listener);
        let (id, current) = {
            let mut table = lock(&self.shared.table);
            let id = table.next_id;
            table.next_id = table.next_id.wrapping_add(1);
            table.listeners.insert(id, Arc::clone(&listener));
            (id, table.current.clone())
        };
        tracing::debug!(subscription = id, "session listener registered");
        listener(current);
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    /// Stores `identity` as current and notifies every listener.
    ///
    /// Publishing the same identity again still notifies.
    pub fn publish(&self, identity: Option<Identity>) {
        let _emit = lock(&self.shared.emit);
        let listeners: Vec<SharedListener> = {
            let mut table = lock(&self.shared.table);
            table.current.clone_from(&identity);
            table.listeners.values().cloned().collect()
        };
        tracing::debug!(
            signed_in = identity.is_some(),
            listeners = listeners.len(),
            "publishing session change"
        );
        for listener in listeners {
            listener(identity.clone());
        }
    }
}

/// Live registration of a session listener.
///
/// Dropping the handle unregisters the listener. Outliving the provider is
/// fine: the handle then does nothing.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    shared: Weak<Shared>,
    id: Option<u64>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.shared.strong_count() > 0
    }

    /// Unregisters the listener now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared.table).listeners.remove(&id);
            tracing::debug!(subscription = id, "session listener removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn channel_listener() -> (SessionListener, mpsc::Receiver<Option<Identity>>) {
        let (tx, rx) = mpsc::channel();
        let listener: SessionListener = Box::new(move |identity| {
            let _ = tx.send(identity);
        });
        (listener, rx)
    }

    #[test]
    fn test_subscribe_replays_current_identity() {
        let registry = ListenerRegistry::with_identity(Identity::new("u1", "a@b.com"));
        let (listener, rx) = channel_listener();

        let _sub = registry.subscribe(listener);

        assert_eq!(rx.try_recv().unwrap(), Some(Identity::new("u1", "a@b.com")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_replays_none_when_signed_out() {
        let registry = ListenerRegistry::new();
        let (listener, rx) = channel_listener();

        let _sub = registry.subscribe(listener);

        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[test]
    fn test_publish_reaches_listeners_in_order() {
        let registry = ListenerRegistry::new();
        let (listener, rx) = channel_listener();
        let _sub = registry.subscribe(listener);

        registry.publish(Some(Identity::new("u1", "a@b.com")));
        registry.publish(None);

        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            seen,
            vec![None, Some(Identity::new("u1", "a@b.com")), None]
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = ListenerRegistry::new();
        let (listener, rx) = channel_listener();
        let sub = registry.subscribe(listener);
        assert_eq!(registry.listener_count(), 1);

        drop(sub);
        registry.publish(Some(Identity::new("u1", "a@b.com")));

        assert_eq!(registry.listener_count(), 0);
        assert_eq!(rx.try_iter().count(), 1); // only the initial replay
    }

    #[test]
    fn test_unsubscribe_is_explicit_release() {
        let registry = ListenerRegistry::new();
        let (listener, _rx) = channel_listener();
        let sub = registry.subscribe(listener);

        sub.unsubscribe();

        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_registry_is_inert() {
        let registry = ListenerRegistry::new();
        let (listener, _rx) = channel_listener();
        let sub = registry.subscribe(listener);

        drop(registry);

        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_panicking_unwind_still_unsubscribes() {
        let registry = ListenerRegistry::new();
        let cloned = registry.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let (listener, _rx) = channel_listener();
            let _sub = cloned.subscribe(listener);
            panic!("teardown failure");
        }));

        assert!(result.is_err());
        assert_eq!(registry.listener_count(), 0);
    }
}
