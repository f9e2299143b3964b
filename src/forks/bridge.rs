//! Observer that carries a source's appends into a fork.

use crate::error::{ListError, Result};
use crate::list::ListInner;
use crate::subscriptions::Observer;
use crate::types::ListEvent;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::Weak;
use tracing::trace;

/// Where the fork stands relative to its source.
struct Progress<T> {
    /// Next source index to apply. None until the seed copy is installed.
    next: Option<usize>,

    /// Events that arrived ahead of `next`, keyed by source index.
    parked: BTreeMap<usize, T>,

    /// Set while one thread is applying parked events.
    draining: bool,
}

/// Bridges one source list to one fork.
///
/// The bridge is subscribed before the source is copied, so events can
/// arrive while the fork is still empty, and deliveries from racing
/// appenders can arrive out of index order. Every event is parked by its
/// source index and applied strictly in index order, starting right after
/// the seed copy. Events inside the copy are discarded.
pub(crate) struct ForkBridge<T> {
    /// The fork. Only upgraded for the duration of one append.
    target: Weak<ListInner<T>>,
    progress: Mutex<Progress<T>>,
}

impl<T: Clone + Send + Sync + 'static> ForkBridge<T> {
    pub(crate) fn new(target: Weak<ListInner<T>>) -> Self {
        Self {
            target,
            progress: Mutex::new(Progress {
                next: None,
                parked: BTreeMap::new(),
                draining: false,
            }),
        }
    }

    /// Mark the fork as holding the first `seed_len` source elements and
    /// apply anything that arrived past them in the meantime.
    ///
    /// Must run after the seed copy is in the target. Returns the number
    /// of elements applied.
    pub(crate) fn seed(&self, seed_len: usize) -> usize {
        let mut progress = self.progress.lock();
        progress.parked = progress.parked.split_off(&seed_len);
        progress.next = Some(seed_len);
        self.drain(progress).unwrap_or(0)
    }

    fn forward(&self, index: usize, value: T) -> Result<()> {
        let mut progress = self.progress.lock();

        if let Some(next) = progress.next {
            if index < next {
                trace!(index, next, "fork already holds element");
                return Ok(());
            }
        }

        progress.parked.insert(index, value);
        self.drain(progress).map(|_| ())
    }

    /// Apply parked events while the next expected index is available.
    ///
    /// Only one thread drains at a time; others park and return, and the
    /// drainer picks their events up. The lock is released around each
    /// append so the fork's own observers may append to the source.
    fn drain(&self, mut progress: MutexGuard<'_, Progress<T>>) -> Result<usize> {
        if progress.draining {
            return Ok(0);
        }
        let Some(mut next) = progress.next else {
            return Ok(0);
        };

        progress.draining = true;
        let mut applied = 0;

        while let Some(value) = progress.parked.remove(&next) {
            let Some(target) = self.target.upgrade() else {
                progress.parked.clear();
                progress.draining = false;
                return Err(ListError::Detached);
            };

            next += 1;
            progress.next = Some(next);
            MutexGuard::unlocked(&mut progress, move || {
                target.append(value);
            });
            applied += 1;
        }

        progress.draining = false;
        Ok(applied)
    }
}

impl<T: Clone + Send + Sync + 'static> Observer<T> for ForkBridge<T> {
    fn on_event(&self, event: &ListEvent<T>) -> Result<()> {
        match event {
            ListEvent::Appended { index, value } => self.forward(*index, value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ListConfig;
    use std::sync::Arc;

    fn target() -> Arc<ListInner<&'static str>> {
        Arc::new(ListInner::new(ListConfig::default(), Vec::new()))
    }

    fn appended(index: usize, value: &'static str) -> ListEvent<&'static str> {
        ListEvent::Appended { index, value }
    }

    #[test]
    fn test_events_before_seed_are_parked_and_replayed() {
        let inner = target();
        let bridge = ForkBridge::new(Arc::downgrade(&inner));

        // Index 1 is covered by the seed copy, 3 and 2 are not.
        bridge.on_event(&appended(1, "y")).unwrap();
        bridge.on_event(&appended(3, "w")).unwrap();
        bridge.on_event(&appended(2, "z")).unwrap();
        assert!(inner.snapshot().is_empty());

        inner.extend_seed(vec!["x", "y"]);
        assert_eq!(bridge.seed(2), 2);

        assert_eq!(inner.snapshot().into_vec(), vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn test_events_inside_seed_are_skipped() {
        let inner = target();
        let bridge = ForkBridge::new(Arc::downgrade(&inner));
        inner.extend_seed(vec!["x", "y"]);
        bridge.seed(2);

        bridge.on_event(&appended(0, "x")).unwrap();
        bridge.on_event(&appended(2, "z")).unwrap();

        assert_eq!(inner.snapshot().into_vec(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_out_of_order_events_applied_in_index_order() {
        let inner = target();
        let bridge = ForkBridge::new(Arc::downgrade(&inner));
        bridge.seed(0);

        bridge.on_event(&appended(2, "c")).unwrap();
        bridge.on_event(&appended(1, "b")).unwrap();
        // Held back until index 0 shows up
        assert!(inner.snapshot().is_empty());

        bridge.on_event(&appended(0, "a")).unwrap();
        assert_eq!(inner.snapshot().into_vec(), vec!["a", "b", "c"]);

        bridge.on_event(&appended(3, "d")).unwrap();
        assert_eq!(inner.snapshot().into_vec(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dropped_target_reports_detached() {
        let inner = target();
        let bridge = ForkBridge::new(Arc::downgrade(&inner));
        bridge.seed(0);
        drop(inner);

        let result = bridge.on_event(&appended(0, "x"));
        assert!(matches!(result, Err(ListError::Detached)));
    }
}
