// ABOUTME: Shuffle and de-duplication helpers shared by the fallback pool and favorites
// ABOUTME: Includes a bounded, order-preserving unique selection buffer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Copy of `items` in random order
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

/// Drop repeated ids, keeping the first occurrence
pub fn dedup_preserving_order<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter_map(|id| {
            let id = id.as_ref();
            seen.insert(id.to_owned()).then(|| id.to_owned())
        })
        .collect()
}

/// Insertion-ordered list of items with unique keys and a hard capacity
#[derive(Debug, Clone)]
pub struct UniqueSelection<T> {
    keys: HashSet<String>,
    items: Vec<T>,
    capacity: usize,
}

impl<T> UniqueSelection<T> {
    /// Empty selection holding at most `capacity` items
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: HashSet::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Whether `key` was already selected
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Whether no more items are accepted
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Number of selected items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append `item` under `key` unless full or already present
    ///
    /// Returns whether the item was accepted.
    pub fn push(&mut self, key: &str, item: T) -> bool {
        if self.is_full() || self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_owned());
        self.items.push(item);
        true
    }

    /// Selected items in insertion order
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
