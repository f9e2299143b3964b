//! Observer set that fans list events out to subscribers.

use crate::types::{ListEvent, SubscriptionId};
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::types::{Observer, Registry, Subscription};

/// Internal registration state.
struct Entry<T> {
    id: SubscriptionId,
    observer: Arc<dyn Observer<T>>,
    /// Cleared on removal so in-flight deliveries skip this entry.
    active: Arc<AtomicBool>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observer: Arc::clone(&self.observer),
            active: Arc::clone(&self.active),
        }
    }
}

/// Insertion-ordered set of observers for one list.
///
/// Guarded by its own lock, never held together with the list's element
/// lock, and never held while an observer runs.
pub(crate) struct ObserverSet<T> {
    entries: RwLock<Vec<Entry<T>>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    label: String,
}

impl<T: 'static> ObserverSet<T> {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            label: label.into(),
        }
    }

    /// Register an observer for future events.
    pub(crate) fn subscribe(self: &Arc<Self>, observer: Arc<dyn Observer<T>>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));

        let count = {
            let mut entries = self.entries.write();
            entries.push(Entry {
                id,
                observer,
                active: Arc::new(AtomicBool::new(true)),
            });
            entries.len()
        };

        debug!(list = %self.label, subscription = %id, observers = count, "subscribed");

        let registry: Weak<Self> = Arc::downgrade(self);
        let registry: Weak<dyn Registry> = registry;
        Subscription::new(id, registry)
    }

    /// Deliver an event to every current observer, in registration order.
    ///
    /// Failures and panics raised by observers are discarded. Returns the
    /// number of observers the event was handed to.
    pub(crate) fn notify(&self, event: &ListEvent<T>) -> usize {
        let entries: Vec<Entry<T>> = {
            let entries = self.entries.read();
            if entries.is_empty() {
                return 0;
            }
            entries.clone()
        };

        let mut delivered = 0;
        for entry in &entries {
            if !entry.active.load(Ordering::SeqCst) {
                continue;
            }
            let observer = &entry.observer;
            let _ = panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event)));
            delivered += 1;
        }

        trace!(list = %self.label, kind = event.kind(), delivered, "notified");
        delivered
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl<T: 'static> Registry for ObserverSet<T> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            entries
                .iter()
                .position(|e| e.id == id)
                .map(|pos| {
                    let entry = entries.remove(pos);
                    entry.active.store(false, Ordering::SeqCst);
                    (entry, entries.len())
                })
        };

        match removed {
            Some((_entry, count)) => {
                debug!(list = %self.label, subscription = %id, observers = count, "unsubscribed");
                true
            }
            None => false,
        }
    }
}
