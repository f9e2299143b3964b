//! Subscription types for observable lists.

use crate::error::{ListError, Result};
use crate::types::{ListEvent, Snapshot, SubscriptionId};
use crossbeam_channel::TrySendError;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use tracing::debug;

/// Receives change events from a list.
///
/// Called synchronously on the appending thread. Returning an error (or
/// panicking) does not affect the append or other observers; the failure
/// is discarded by the publisher.
pub trait Observer<T>: Send + Sync {
    fn on_event(&self, event: &ListEvent<T>) -> Result<()>;
}

impl<T, F> Observer<T> for F
where
    F: Fn(&ListEvent<T>) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &ListEvent<T>) -> Result<()> {
        self(event)
    }
}

/// Something that can be subscribed to and seeded from.
///
/// Implementors must publish `ListEvent::Appended` with the index the
/// value occupies in their own snapshots; forks rely on that to avoid
/// applying an element twice.
pub trait Observable<T> {
    /// Register for events published after this call.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription;

    /// Copy of the current contents.
    fn snapshot(&self) -> Snapshot<T>;
}

/// Removal side of an observer set, erased over the element type.
pub(crate) trait Registry: Send + Sync {
    fn remove(&self, id: SubscriptionId) -> bool;
}

/// Handle to an active registration.
///
/// Dropping the handle leaves the registration in place; call
/// [`dispose`](Self::dispose) to stop delivery.
#[must_use = "dropping a Subscription keeps the observer registered; call dispose() to cancel"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Registry>,
    disposed: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: Weak<dyn Registry>) -> Self {
        Self {
            id,
            registry,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the observer from its list.
    ///
    /// Idempotent. Once this returns, no notification that starts later
    /// reaches the observer; one already running may finish.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn registration(&self) -> (SubscriptionId, Weak<dyn Registry>) {
        (self.id, Weak::clone(&self.registry))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Forwards events into a bounded channel.
///
/// A full buffer drops the event. Once the receiving side is gone the
/// observer removes its own registration.
pub(crate) struct ChannelObserver<T> {
    sender: crossbeam_channel::Sender<ListEvent<T>>,
    registration: OnceLock<(SubscriptionId, Weak<dyn Registry>)>,
}

impl<T> ChannelObserver<T> {
    pub(crate) fn new(sender: crossbeam_channel::Sender<ListEvent<T>>) -> Self {
        Self {
            sender,
            registration: OnceLock::new(),
        }
    }

    /// Remember which registration to remove on disconnect.
    pub(crate) fn bind(&self, subscription: &Subscription) {
        let _ = self.registration.set(subscription.registration());
    }

    fn unregister(&self) {
        if let Some((id, registry)) = self.registration.get() {
            if let Some(registry) = registry.upgrade() {
                if registry.remove(*id) {
                    debug!(subscription = %id, "channel receiver gone, unsubscribed");
                }
            }
        }
    }
}

impl<T: Clone + Send> Observer<T> for ChannelObserver<T> {
    fn on_event(&self, event: &ListEvent<T>) -> Result<()> {
        match self.sender.try_send(event.clone()) {
            Err(TrySendError::Disconnected(_)) => {
                self.unregister();
                Err(ListError::ChannelClosed)
            }
            sent => Ok(sent?),
        }
    }
}

/// Subscription whose events are buffered in a channel.
///
/// Events that do not fit in the buffer are dropped for this subscriber
/// only. Dropping the receiver ends the registration at the next append.
#[must_use = "dropping a ChannelSubscription unsubscribes at the next append"]
pub struct ChannelSubscription<T> {
    subscription: Subscription,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<ListEvent<T>>,
}

impl<T> ChannelSubscription<T> {
    pub(crate) fn new(
        subscription: Subscription,
        receiver: crossbeam_channel::Receiver<ListEvent<T>>,
    ) -> Self {
        Self {
            subscription,
            receiver,
        }
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> std::result::Result<ListEvent<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> std::result::Result<ListEvent<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> std::result::Result<ListEvent<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Split into the plain handle and the receiver.
    pub fn into_parts(self) -> (Subscription, crossbeam_channel::Receiver<ListEvent<T>>) {
        (self.subscription, self.receiver)
    }
}

impl<T> Deref for ChannelSubscription<T> {
    type Target = Subscription;

    fn deref(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> fmt::Debug for ChannelSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSubscription")
            .field("subscription", &self.subscription)
            .field("buffered", &self.receiver.len())
            .finish()
    }
}
