// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client and endpoint class.
//!
//! Each `client:class` key gets `max_requests` per window. The first request
//! after a window ends opens a new one. Known limits of the scheme:
//!
//! - a client can fire up to twice the budget in a burst that straddles a
//!   window boundary;
//! - counters live in the injected store, so with the in-memory store every
//!   gateway instance enforces its own independent budget.
//!
//! Expired entries are removed by a sampled sweep on the request path, by a
//! periodic [`RateLimiter::cleanup`], and lazily whenever their key is seen
//! again.

use crate::class::{classify, EndpointClass};
use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use crate::error::RateLimitExceeded;
use crate::store::{InMemoryStore, RateLimitEntry, RateLimitStore};
use axum::http::Method;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub class: EndpointClass,
    /// Budget for the class
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub reset_in_secs: u64,
}

/// Thread-safe rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

/// Store key for a client and class.
pub fn rate_key(client: &str, class: EndpointClass) -> String {
    format!("{}:{}", client, class.as_str())
}

/// Whole seconds from `now_ms` until `deadline_ms`, rounded up.
fn seconds_until(deadline_ms: u64, now_ms: u64) -> u64 {
    deadline_ms.saturating_sub(now_ms).div_ceil(1000)
}

impl RateLimiter {
    /// Create a limiter backed by the in-memory store and the wall clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_parts(config, Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of keys currently tracked.
    pub fn tracked_entries(&self) -> usize {
        self.store.len()
    }

    /// Classify the request, then admit or reject it.
    pub fn check_request(
        &self,
        client: &str,
        method: &Method,
        path: &str,
    ) -> Result<Admission, RateLimitExceeded> {
        self.check(client, classify(method, path))
    }

    /// Admit or reject one request from `client` against `class`.
    pub fn check(&self, client: &str, class: EndpointClass) -> Result<Admission, RateLimitExceeded> {
        let limit = self.config.limit_for(class);
        let now = self.clock.now_ms();
        let key = rate_key(client, class);

        let mut outcome: Option<Result<RateLimitEntry, RateLimitEntry>> = None;
        let mut opened_window = false;
        self.store.update(&key, &mut |current| match current {
            Some(entry) if !entry.is_expired(now) => {
                if entry.count < limit.max_requests {
                    let next = RateLimitEntry {
                        count: entry.count + 1,
                        ..entry
                    };
                    outcome = Some(Ok(next));
                    Some(next)
                } else {
                    outcome = Some(Err(entry));
                    None
                }
            }
            _ => {
                let fresh = RateLimitEntry {
                    count: 1,
                    window_reset_at_ms: now.saturating_add(limit.window_ms),
                };
                opened_window = true;
                outcome = Some(Ok(fresh));
                Some(fresh)
            }
        });

        let result = match outcome {
            Some(Ok(entry)) => {
                let admission = Admission {
                    class,
                    limit: limit.max_requests,
                    remaining: limit.max_requests.saturating_sub(entry.count),
                    reset_in_secs: seconds_until(entry.window_reset_at_ms, now),
                };
                debug!(
                    %client,
                    class = %class,
                    count = entry.count,
                    remaining = admission.remaining,
                    "Request admitted"
                );
                Ok(admission)
            }
            Some(Err(entry)) => {
                let retry_after_secs = seconds_until(entry.window_reset_at_ms, now).max(1);
                debug!(%client, class = %class, retry_after_secs, "Rate limit exceeded");
                Err(RateLimitExceeded {
                    class,
                    limit: limit.max_requests,
                    window_minutes: limit.window_minutes(),
                    retry_after_secs,
                })
            }
            None => {
                warn!(%key, "Store skipped the update, admitting request");
                Ok(Admission {
                    class,
                    limit: limit.max_requests,
                    remaining: limit.max_requests.saturating_sub(1),
                    reset_in_secs: seconds_until(now.saturating_add(limit.window_ms), now),
                })
            }
        };

        if opened_window && self.over_capacity() {
            self.enforce_capacity();
        }
        self.maybe_sweep();

        result
    }

    /// Run [`Self::sweep_expired`] on a sampled fraction of calls.
    ///
    /// Returns the number of removed entries when a sweep ran.
    pub fn maybe_sweep(&self) -> Option<usize> {
        let p = self.config.cleanup_probability;
        // Also rejects NaN.
        if !(p > 0.0) {
            return None;
        }
        if p >= 1.0 || rand::thread_rng().gen_bool(p) {
            Some(self.sweep_expired())
        } else {
            None
        }
    }

    /// Delete every entry whose window is over.
    ///
    /// Expiry is re-checked at delete time, so a key reopened by a request
    /// after the snapshot was taken survives.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut removed = 0;
        for (key, entry) in self.store.entries() {
            if entry.is_expired(now) && self.store.delete_if(&key, &|e| e.is_expired(now)) {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, remaining = self.store.len(), "Swept expired rate limit entries");
        }
        removed
    }

    fn over_capacity(&self) -> bool {
        self.config.max_entries > 0 && self.store.len() > self.config.max_entries
    }

    /// Start of the window an entry belongs to.
    fn window_start(&self, key: &str, entry: &RateLimitEntry) -> u64 {
        let window_ms = key
            .rsplit_once(':')
            .and_then(|(_, suffix)| EndpointClass::ALL.into_iter().find(|c| c.as_str() == suffix))
            .map_or(0, |class| self.config.limit_for(class).window_ms);
        entry.window_reset_at_ms.saturating_sub(window_ms)
    }

    /// Evict entries whose windows started first until `max_entries` holds.
    ///
    /// An entry is only evicted if it still holds the window seen in the
    /// snapshot.
    pub fn enforce_capacity(&self) -> usize {
        let max = self.config.max_entries;
        if max == 0 {
            return 0;
        }

        let mut entries = self.store.entries();
        if entries.len() <= max {
            return 0;
        }

        entries.sort_by_key(|(key, entry)| self.window_start(key, entry));
        let surplus = entries.len() - max;
        let mut evicted = 0;
        for (key, seen) in entries.iter().take(surplus) {
            if self
                .store
                .delete_if(key, &|e| e.window_reset_at_ms == seen.window_reset_at_ms)
            {
                evicted += 1;
            }
        }
        warn!(evicted, max_entries = max, "Rate limit store over capacity");
        evicted
    }

    /// Periodic maintenance: sweep expired entries, then enforce capacity.
    pub fn cleanup(&self) -> usize {
        self.sweep_expired() + self.enforce_capacity()
    }
}
