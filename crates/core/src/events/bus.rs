//! Listener bus for sync lifecycle events.
//!
//! Replaces ad hoc mutable callback sets with an explicit publish/subscribe
//! interface: [`EventBus::subscribe`] returns a [`Subscription`] token that
//! removes the listener when dropped (or explicitly via
//! [`Subscription::unsubscribe`]).
//!
//! # Emission contract
//!
//! - Listeners are invoked synchronously, in registration order.
//! - A panicking listener never aborts emission: the panic is caught and
//!   logged, and the remaining listeners still run.
//! - `emit()` must stay fast; listeners that need to do real work should
//!   hand off to their own task.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use log::error;

use super::SyncEvent;

type Listener = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    // BTreeMap keyed by registration counter keeps emission in
    // registration order.
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

/// Publish/subscribe bus for [`SyncEvent`]s.
///
/// Cheap to clone; clones share the same listener registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The listener stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .lock()
            .unwrap()
            .insert(id, Arc::new(listener));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Emit an event to every registered listener.
    pub fn emit(&self, event: &SyncEvent) {
        // Snapshot the listeners so a listener that subscribes or
        // unsubscribes reentrantly cannot deadlock the registry lock.
        let listeners: Vec<Listener> = {
            let guard = self.registry.listeners.lock().unwrap();
            guard.values().cloned().collect()
        };

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!("Event listener panicked while handling {:?}", event);
            }
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.lock().unwrap().len()
    }
}

/// Unsubscribe token returned by [`EventBus::subscribe`].
///
/// Dropping the token removes the listener.
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the listener now instead of waiting for drop.
    pub fn unsubscribe(self) {
        // Drop impl does the actual removal.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.listeners.lock().unwrap().remove(&self.id);
        }
    }
}
