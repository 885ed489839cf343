//! Cache Entry Module
//!
//! Defines a cached document buffer and its last-access time.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// A fetched document held by the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The raw document bytes, never mutated after insertion
    payload: Bytes,
    /// Last time the entry was inserted or returned from a lookup
    last_used: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry last used at `now`.
    pub fn new(payload: Bytes, now: Instant) -> Self {
        Self {
            payload,
            last_used: now,
        }
    }

    /// Returns a handle to the payload. Cloning `Bytes` shares the buffer.
    pub fn payload(&self) -> Bytes {
        self.payload.clone()
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn last_used(&self) -> Instant {
        self.last_used
    }

    // == Touch ==
    /// Marks the entry as used at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.last_used = now;
    }

    // == Idle Check ==
    /// Returns true when the entry has been idle strictly longer than `retention`.
    ///
    /// A `now` earlier than `last_used` counts as zero idle time.
    pub fn is_idle_longer_than(&self, retention: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_used) > retention
    }
}
