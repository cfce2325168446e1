// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded FIFO cache of query embeddings.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Vec<f32>>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

/// Thread-safe embedding cache with strict first-in-first-out eviction.
///
/// Reads do not refresh an entry's position, and re-inserting an existing key
/// replaces its vector without moving it in the eviction order.
#[derive(Debug)]
pub struct EmbeddingCache {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl EmbeddingCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.lock().entries.get(key).cloned()
    }

    pub fn insert(&self, key: &str, vector: Vec<f32>) {
        let mut inner = self.lock();
        if let Some(existing) = inner.entries.get_mut(key) {
            *existing = vector;
            return;
        }
        while inner.order.len() >= self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    debug!(key_len = oldest.len(), "evicted oldest cached embedding");
                }
                None => break,
            }
        }
        inner.order.push_back(key.to_string());
        inner.entries.insert(key.to_string(), vector);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    // A panic while holding the lock leaves the maps consistent, so a
    // poisoned guard is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
