//! Error handling and edge case tests.

use livelist::{ListError, ListEvent, ObservableList, Result};
use std::sync::Arc;

// --- Storage Errors ---

#[test]
fn test_at_on_empty_list() {
    let list: ObservableList<String> = ObservableList::new();

    let result = list.at(0);
    assert!(matches!(
        result,
        Err(ListError::IndexOutOfRange { index: 0, len: 0 })
    ));
    assert!(list.is_empty());
}

#[test]
fn test_at_past_end() {
    let list = ObservableList::from_vec(vec![1, 2, 3]);

    assert_eq!(list.at(2).unwrap(), 3);
    let err = list.at(3).unwrap_err();
    assert_eq!(err.to_string(), "Index out of range: 3 (length is 3)");

    // Appending makes the index valid
    list.append(4);
    assert_eq!(list.at(3).unwrap(), 4);
}

#[test]
fn test_get_is_non_failing() {
    let list = ObservableList::from_vec(vec!["only"]);
    assert_eq!(list.get(0), Some("only"));
    assert_eq!(list.get(usize::MAX), None);
}

// --- Delivery Errors ---

/// Consumer written the recommended way: unknown kinds fail loudly.
fn strict_consumer(event: &ListEvent<u32>) -> Result<u32> {
    match event {
        ListEvent::Appended { value, .. } => Ok(*value),
        other => Err(ListError::UnsupportedEvent(other.kind())),
    }
}

#[test]
fn test_strict_consumer_accepts_appended() {
    let event = ListEvent::Appended { index: 0, value: 9 };
    assert_eq!(strict_consumer(&event).unwrap(), 9);
}

#[test]
fn test_observer_errors_never_reach_appender() {
    let list = ObservableList::new();

    let _always_fails = list.subscribe_fn(|event: &ListEvent<u32>| {
        Err(ListError::Observer(format!("rejected {}", event.index())))
    });
    let _strict = list.subscribe_fn(|event: &ListEvent<u32>| strict_consumer(event).map(|_| ()));

    for i in 0..10 {
        assert_eq!(list.append(i), i as usize);
    }
    assert_eq!(list.len(), 10);
}

#[test]
fn test_closed_channel_unsubscribes() {
    let list = ObservableList::new();
    let handle = list.subscribe_channel(4);
    let (subscription, receiver) = handle.into_parts();
    drop(receiver);

    list.append(1u32);
    list.append(2u32);

    assert_eq!(list.len(), 2);
    // The first failed delivery removes the registration
    assert_eq!(list.observer_count(), 0);
    subscription.dispose();
    assert!(subscription.is_disposed());
    assert_eq!(list.observer_count(), 0);
}

#[test]
fn test_closed_channel_leaves_other_observers() {
    let list = ObservableList::new();
    let kept = list.subscribe_channel(4);
    let (_subscription, receiver) = list.subscribe_channel(4).into_parts();
    drop(receiver);

    list.append(1u32);
    list.append(2u32);

    assert_eq!(list.observer_count(), 1);
    assert_eq!(kept.receiver.len(), 2);
}

#[test]
fn test_zero_capacity_channel() {
    let list = ObservableList::new();
    let handle = list.subscribe_channel(0);

    // Nobody is waiting on a rendezvous channel, so delivery fails quietly
    list.append("dropped");
    assert!(handle.try_recv().is_err());
    assert_eq!(list.to_vec(), vec!["dropped"]);
}

// --- Subscription Lifecycle ---

#[test]
fn test_dispose_after_list_dropped() {
    let list = ObservableList::new();
    let handle = list.subscribe_fn(|_: &ListEvent<u8>| Ok(()));

    drop(list);
    handle.dispose();
    handle.dispose();
    assert!(handle.is_disposed());
}

#[test]
fn test_dropped_handle_keeps_observer() {
    let list = ObservableList::new();
    let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let handle = list.subscribe_fn(move |_: &ListEvent<u8>| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    });
    drop(handle);

    list.append(1);
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(list.observer_count(), 1);
}

#[test]
fn test_detach_on_plain_list() {
    let list = ObservableList::from_vec(vec![1]);
    assert!(!list.is_forked());
    assert!(!list.detach());
}

#[test]
fn test_fork_of_empty_source() {
    let source: ObservableList<u8> = ObservableList::new();
    let fork = ObservableList::fork(&source);
    assert!(fork.is_empty());

    source.append(7);
    assert_eq!(fork.to_vec(), vec![7]);
}

#[test]
fn test_source_outlives_dropped_fork() {
    let source = ObservableList::from_vec(vec![1]);
    let fork = ObservableList::fork(&source);
    drop(fork);

    // No observer left to deliver to
    assert_eq!(source.append(2), 1);
    assert_eq!(source.observer_count(), 0);
}

#[test]
fn test_fork_outlives_source() {
    let source = ObservableList::from_vec(vec![1, 2]);
    let fork = ObservableList::fork(&source);
    drop(source);

    // The subscription handle outlives its registry
    assert!(fork.is_forked());
    fork.append(3);
    assert_eq!(fork.to_vec(), vec![1, 2, 3]);
    assert!(fork.detach());
}
