//! The observable list tying storage, publishing and forks together.

use crate::error::{ListError, Result};
use crate::forks::ForkBridge;
use crate::subscriptions::{
    ChannelObserver, ChannelSubscription, Observable, Observer, ObserverSet, Subscription,
};
use crate::types::{ListConfig, ListEvent, Snapshot};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Shared state behind every handle to one list.
pub(crate) struct ListInner<T> {
    config: ListConfig,

    /// Elements, append-only.
    items: RwLock<Vec<T>>,

    /// Observers, locked independently of `items`.
    observers: Arc<ObserverSet<T>>,

    /// Subscription on the source this list was forked from.
    upstream: Mutex<Option<Subscription>>,
}

impl<T: Clone + Send + Sync + 'static> ListInner<T> {
    pub(crate) fn new(config: ListConfig, mut items: Vec<T>) -> Self {
        items.reserve(config.initial_capacity.saturating_sub(items.len()));
        let observers = Arc::new(ObserverSet::new(config.label()));

        Self {
            config,
            items: RwLock::new(items),
            observers,
            upstream: Mutex::new(None),
        }
    }

    /// Push under the write lock, release it, then notify.
    pub(crate) fn append(&self, value: T) -> usize {
        let index = {
            let mut items = self.items.write();
            items.push(value.clone());
            items.len() - 1
        };

        trace!(list = %self.config.label(), index, "appended");
        self.observers.notify(&ListEvent::Appended { index, value });
        index
    }

    /// Add elements without publishing events.
    pub(crate) fn extend_seed(&self, seed: Vec<T>) {
        self.items.write().extend(seed);
    }

    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        let items = self.items.read().clone();
        Snapshot::new(items)
    }

    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }
}

impl<T> Drop for ListInner<T> {
    fn drop(&mut self) {
        if let Some(subscription) = self.upstream.get_mut().take() {
            subscription.dispose();
            debug!(
                list = %self.config.label(),
                subscription = %subscription.id(),
                "fork dropped, left source"
            );
        }
    }
}

/// A thread-safe, append-only list that publishes its appends.
///
/// Cloning yields another handle to the same list. Reads take a shared
/// lock, appends an exclusive one; observers are called after the
/// exclusive lock has been released, so an observer may append to any
/// list, including the one notifying it.
///
/// # Example
///
/// ```ignore
/// let helpers = ObservableList::from_vec(vec!["if", "each"]);
/// let local = ObservableList::fork(&helpers);
///
/// helpers.append("with");   // reaches `local` too
/// local.append("lookup");   // stays in `local`
///
/// assert_eq!(local.to_vec(), vec!["if", "each", "with", "lookup"]);
/// assert_eq!(helpers.len(), 3);
/// ```
pub struct ObservableList<T> {
    inner: Arc<ListInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::with_config(ListConfig::default())
    }

    /// Create an empty list with `config`.
    pub fn with_config(config: ListConfig) -> Self {
        Self::from_vec_with_config(Vec::new(), config)
    }

    /// Create a list holding `items`, in order.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_vec_with_config(items, ListConfig::default())
    }

    /// Create a list holding `items` with `config`.
    pub fn from_vec_with_config(items: Vec<T>, config: ListConfig) -> Self {
        Self {
            inner: Arc::new(ListInner::new(config, items)),
        }
    }

    /// Create a list seeded with the current contents of `source` that
    /// keeps receiving `source`'s later appends.
    pub fn fork<S>(source: &S) -> Self
    where
        S: Observable<T> + ?Sized,
    {
        Self::fork_with_config(source, ListConfig::default())
    }

    /// Like [`fork`](Self::fork), with `config` for the new list.
    pub fn fork_with_config<S>(source: &S, config: ListConfig) -> Self
    where
        S: Observable<T> + ?Sized,
    {
        let list = Self::with_config(config);
        let bridge = Arc::new(ForkBridge::new(Arc::downgrade(&list.inner)));

        // Subscribe first, copy second: anything appended in between is
        // either in the copy or parked in the bridge by its index.
        let observer: Arc<dyn Observer<T>> = bridge.clone();
        let subscription = source.subscribe(observer);
        let seed = source.snapshot();
        let seed_len = seed.len();

        list.inner.extend_seed(seed.into_vec());
        let replayed = bridge.seed(seed_len);

        debug!(
            list = %list.inner.config.label(),
            subscription = %subscription.id(),
            seed_len,
            replayed,
            "forked"
        );
        *list.inner.upstream.lock() = Some(subscription);

        list
    }

    // --- Storage ---

    /// Append a value and notify observers. Returns the value's index.
    pub fn append(&self, value: T) -> usize {
        self.inner.append(value)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    pub fn at(&self, index: usize) -> Result<T> {
        let items = self.inner.items.read();
        items
            .get(index)
            .cloned()
            .ok_or(ListError::IndexOutOfRange {
                index,
                len: items.len(),
            })
    }

    /// Element at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.get(index)
    }

    /// Copy the current contents.
    ///
    /// The lock is held only while copying; iterating the snapshot holds
    /// nothing.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.snapshot()
    }

    /// Current contents as a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.snapshot().into_vec()
    }

    // --- Subscriptions ---

    /// Register an observer for appends made after this call.
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        self.inner.observers.subscribe(observer)
    }

    /// Register a closure as an observer.
    pub fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(&ListEvent<T>) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(f))
    }

    /// Register a channel that buffers up to `buffer_size` events.
    pub fn subscribe_channel(&self, buffer_size: usize) -> ChannelSubscription<T> {
        let (sender, receiver) = crossbeam_channel::bounded(buffer_size);
        let observer = Arc::new(ChannelObserver::new(sender));
        let subscription = self.subscribe(Arc::clone(&observer) as Arc<dyn Observer<T>>);
        observer.bind(&subscription);
        ChannelSubscription::new(subscription, receiver)
    }

    /// Number of registered observers, including fork bridges.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    // --- Forks ---

    /// Stop following the source this list was forked from.
    ///
    /// Returns false if the list is not a fork or was already detached.
    pub fn detach(&self) -> bool {
        let upstream = self.inner.upstream.lock().take();
        match upstream {
            Some(subscription) => {
                subscription.dispose();
                debug!(
                    list = %self.inner.config.label(),
                    subscription = %subscription.id(),
                    "detached"
                );
                true
            }
            None => false,
        }
    }

    /// Whether this list still follows a source.
    pub fn is_forked(&self) -> bool {
        self.inner
            .upstream
            .lock()
            .as_ref()
            .is_some_and(|subscription| !subscription.is_disposed())
    }

    /// Configuration the list was created with.
    pub fn config(&self) -> &ListConfig {
        &self.inner.config
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for ObservableList<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        ObservableList::subscribe(self, observer)
    }

    fn snapshot(&self) -> Snapshot<T> {
        ObservableList::snapshot(self)
    }
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for ObservableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("label", &self.inner.config.label)
            .field("items", &self.snapshot())
            .field("observers", &self.observer_count())
            .finish()
    }
}
