//! Core types for observable lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Unique identifier for a subscription within one list's observer set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change events published by a list.
///
/// Only appends exist today. The enum is non-exhaustive so downstream
/// consumers must carry a fallback arm; that arm should return
/// [`ListError::UnsupportedEvent`](crate::ListError::UnsupportedEvent)
/// rather than ignore the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ListEvent<T> {
    /// A value was appended.
    Appended {
        /// Position the value was stored at in the publishing list.
        index: usize,
        value: T,
    },
}

impl<T> ListEvent<T> {
    /// Static name of the event kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ListEvent::Appended { .. } => "appended",
        }
    }

    /// Index the event refers to.
    pub fn index(&self) -> usize {
        match self {
            ListEvent::Appended { index, .. } => *index,
        }
    }

    /// Split an append event into its index and value.
    pub fn into_appended(self) -> (usize, T) {
        match self {
            ListEvent::Appended { index, value } => (index, value),
        }
    }
}

/// Configuration for a list.
#[derive(Clone, Debug, Default)]
pub struct ListConfig {
    /// Name attached to log events emitted by this list.
    /// Default: None
    pub label: Option<String>,

    /// Capacity reserved up front for elements.
    /// Default: 0
    pub initial_capacity: usize,
}

impl ListConfig {
    /// Config with a log label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Reserve room for `capacity` elements.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Point-in-time copy of a list's contents.
///
/// Holds no lock. Iterating it any number of times yields the same
/// elements, regardless of appends made to the list afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot<T> {
    items: Vec<T>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Iterate the captured elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for Snapshot<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for Snapshot<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_restartable() {
        let snapshot = Snapshot::new(vec![1, 2, 3]);

        let first: Vec<_> = snapshot.iter().copied().collect();
        let second: Vec<_> = (&snapshot).into_iter().copied().collect();

        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_event_accessors() {
        let event = ListEvent::Appended {
            index: 4,
            value: "helper",
        };

        assert_eq!(event.kind(), "appended");
        assert_eq!(event.index(), 4);
        assert_eq!(event.into_appended(), (4, "helper"));
    }

    #[test]
    fn test_config_builders() {
        let config = ListConfig::labeled("helpers").with_capacity(16);
        assert_eq!(config.label(), "helpers");
        assert_eq!(config.initial_capacity, 16);

        assert_eq!(ListConfig::default().label(), "");
    }
}
