//! Newest-first ring buffer used by the UI feeds

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Bounded, newest-first collection
///
/// Pushing beyond capacity drops the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedFeed<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedFeed<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from items already ordered newest-first, keeping the newest `capacity`
    pub fn from_newest_first(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut feed = Self::new(capacity);
        feed.items.extend(items.into_iter().take(feed.capacity));
        feed
    }

    /// Prepend `item`, evicting the oldest entry when full
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Entries newest-first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedFeed<T> {
    /// Up to `n` newest entries, newest-first
    pub fn newest(&self, n: usize) -> Vec<T> {
        self.items.iter().take(n).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedFeed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}
