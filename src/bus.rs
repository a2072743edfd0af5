//! Invalidation Bus
//!
//! Payload-less publish/subscribe channel signalling "saved state changed somewhere,
//! reload your own view of it". Publishing iterates over a snapshot of the registry taken
//! when `publish` starts, so listeners may subscribe or unsubscribe (themselves or others)
//! from inside their own callback. No lock is held while a listener runs.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identifier of one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<SubscriptionId, Listener>>,
}

impl Registry {
    fn remove(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().remove(&id).is_some()
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().contains_key(&id)
    }
}

/// Constructible event bus; clones share one registry.
///
/// Production code wires a single process-lifetime instance; tests build their own.
#[derive(Clone, Default)]
pub struct InvalidationBus {
    registry: Arc<Registry>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Dropping the returned [`Subscription`] removes it.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry.listeners.lock().insert(id, Arc::new(listener));
        trace!(subscription = id.0, "Listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Remove a listener by id. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.remove(id)
    }

    /// Invoke every listener registered when this call starts, once each.
    ///
    /// Listeners added during the call do not see it; listeners removed during the call
    /// are skipped if they have not been invoked yet. No ordering is promised.
    pub fn publish(&self) {
        let snapshot: Vec<(SubscriptionId, Listener)> = self
            .registry
            .listeners
            .lock()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        trace!(listeners = snapshot.len(), "Publishing invalidation");
        for (id, listener) in snapshot {
            if self.registry.contains(id) {
                listener();
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.listeners.lock().len()
    }
}

/// Scoped registration on an [`InvalidationBus`].
///
/// Removes exactly its own listener when dropped or explicitly unsubscribed. Holds only a
/// weak reference, so an outstanding subscription never keeps the bus alive.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.contains(self.id))
            .unwrap_or(false)
    }

    /// Remove the listener now. Same effect as dropping the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                trace!(subscription = self.id.0, "Listener unsubscribed");
            }
        }
    }
}
