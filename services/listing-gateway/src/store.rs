// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Storage for rate limit counters.
//!
//! The limiter only talks to [`RateLimitStore`], so the process-local
//! [`InMemoryStore`] can be replaced by a shared backend without touching
//! admission logic. Counters are never persisted by the in-memory store: a
//! restart resets every budget.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;

/// Counter for one `client:class` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window
    pub count: u32,
    /// End of the current window, epoch milliseconds
    pub window_reset_at_ms: u64,
}

impl RateLimitEntry {
    /// Whether the window is over at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.window_reset_at_ms
    }
}

/// Key/value store for rate limit entries.
pub trait RateLimitStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<RateLimitEntry>;

    fn set(&self, key: &str, entry: RateLimitEntry);

    fn delete(&self, key: &str);

    /// Delete `key` only if its current entry satisfies `predicate`.
    ///
    /// Returns whether an entry was removed. Like [`Self::update`], the
    /// default is not atomic and shared stores should override it.
    fn delete_if(&self, key: &str, predicate: &dyn Fn(&RateLimitEntry) -> bool) -> bool {
        match self.get(key) {
            Some(entry) if predicate(&entry) => {
                self.delete(key);
                true
            }
            _ => false,
        }
    }

    /// Snapshot of every entry.
    fn entries(&self) -> Vec<(String, RateLimitEntry)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the entry for `key` with whatever `apply` returns.
    ///
    /// `None` leaves the stored entry untouched. The default is a plain
    /// get-then-set and is not atomic; stores shared between threads should
    /// override it so concurrent updates to one key cannot lose increments.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<RateLimitEntry>) -> Option<RateLimitEntry>,
    ) {
        if let Some(next) = apply(self.get(key)) {
            self.set(key, next);
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e.value())
    }

    fn set(&self, key: &str, entry: RateLimitEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    fn delete_if(&self, key: &str, predicate: &dyn Fn(&RateLimitEntry) -> bool) -> bool {
        self.entries
            .remove_if(key, |_, entry| predicate(entry))
            .is_some()
    }

    fn entries(&self) -> Vec<(String, RateLimitEntry)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    // Holds the shard lock for `key` while `apply` runs.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<RateLimitEntry>) -> Option<RateLimitEntry>,
    ) {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if let Some(next) = apply(Some(*occupied.get())) {
                    occupied.insert(next);
                }
            }
            Entry::Vacant(vacant) => {
                if let Some(next) = apply(None) {
                    vacant.insert(next);
                }
            }
        }
    }
}
