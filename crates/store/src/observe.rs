//! Explicit change subscriptions
//!
//! No hidden dependency tracking: a consumer that wants to react to
//! mutations opts in with `RecordStore::subscribe` and receives one
//! `ChangeEvent` per mutation, synchronously on the mutating call, after
//! the in-memory change and the persistence attempt. Reads never notify.
//!
//! Dropping the returned `Subscription` unregisters the callback.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tabula_core::RecordId;

/// A mutation that happened on a store.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A record was appended.
    Inserted(RecordId),
    /// A record was updated or patched in place.
    Updated(RecordId),
    /// A record was removed.
    Deleted(RecordId),
    /// The whole collection was replaced.
    Replaced {
        /// New collection length.
        len: usize,
    },
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Registry of subscribed callbacks. One per store, shared by handles.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_token: AtomicU64,
    callbacks: RwLock<Vec<(u64, Callback)>>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(
        registry: &Arc<Self>,
        callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let token = registry.next_token.fetch_add(1, Ordering::Relaxed);
        registry.callbacks.write().push((token, Arc::new(callback)));
        Subscription {
            token,
            registry: Arc::clone(registry),
        }
    }

    pub(crate) fn notify(&self, event: &ChangeEvent) {
        // Snapshot the list and release the lock before invoking: a
        // callback may drop its own Subscription, and unsubscribe needs
        // the write lock on the same thread.
        let callbacks: Vec<Callback> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.callbacks.read().len()
    }

    fn unsubscribe(&self, token: u64) {
        self.callbacks.write().retain(|(t, _)| *t != token);
    }
}

/// Handle for an active subscription; dropping it unsubscribes.
pub struct Subscription {
    token: u64,
    registry: Arc<ObserverRegistry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.token);
    }
}
