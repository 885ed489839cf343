//! Cache Store Module
//!
//! In-memory document index with byte-size accounting, admission control and
//! idle-time sweeping. The store itself is not synchronized; `DocumentCache`
//! wraps it in a lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info};
use url::Url;

use crate::cache::CacheEntry;

// == Admission ==
/// Outcome of offering a fetched document to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The document is now cached
    Admitted,
    /// The document was not retained; the store is unchanged
    Declined,
}

// == Cache Store ==
/// Document index keyed by identifier.
///
/// `size_bytes` always equals the summed payload length of `entries`.
/// Capacity is enforced only when admitting; nothing is evicted to make room.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Document id to cached buffer
    entries: HashMap<String, CacheEntry>,
    /// Remote location documents are fetched from
    base_url: Option<Url>,
    /// Upper bound on `size_bytes` at admission time
    capacity_bytes: u64,
    /// Running total of admitted payload sizes
    size_bytes: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty, unconfigured store. Nothing is admitted until
    /// `configure` sets a capacity.
    pub fn new() -> Self {
        Self::default()
    }

    // == Configure ==
    /// Sets the remote base location and the capacity. Later calls overwrite
    /// earlier ones; cached entries are kept.
    pub fn configure(&mut self, base_url: Url, capacity_bytes: u64) {
        debug!(base_url = %base_url, capacity_bytes, "Configuring document cache");
        self.base_url = Some(base_url);
        self.capacity_bytes = capacity_bytes;
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Current summed size of all cached payloads.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Last-use time of an entry, if cached.
    pub fn last_used(&self, id: &str) -> Option<Instant> {
        self.entries.get(id).map(CacheEntry::last_used)
    }

    // == Lookup ==
    /// Returns the cached payload and refreshes its last-use time.
    pub fn lookup(&mut self, id: &str) -> Option<Bytes> {
        self.lookup_at(id, Instant::now())
    }

    pub(crate) fn lookup_at(&mut self, id: &str, now: Instant) -> Option<Bytes> {
        let entry = self.entries.get_mut(id)?;
        entry.touch(now);
        debug!(id, "Document already in cache");
        Some(entry.payload())
    }

    // == Admit ==
    /// Offers a freshly fetched document to the store.
    ///
    /// Replacing an existing entry first releases its size. The document is
    /// declined when the resulting size would exceed the capacity.
    pub fn admit(&mut self, id: &str, payload: Bytes) -> Admission {
        self.admit_at(id, payload, Instant::now())
    }

    pub(crate) fn admit_at(&mut self, id: &str, payload: Bytes, now: Instant) -> Admission {
        if id.is_empty() {
            debug!("Refusing to cache a document without identifier");
            return Admission::Declined;
        }

        let replaced = self.entries.get(id).map_or(0, CacheEntry::size);
        let new_size = self.size_bytes - replaced + payload.len() as u64;

        if new_size > self.capacity_bytes {
            info!(
                id,
                document_bytes = payload.len(),
                "Cache reached max size, not persisting document"
            );
            debug!("Cache size is {} / {}", self.size_bytes, self.capacity_bytes);
            return Admission::Declined;
        }

        self.entries
            .insert(id.to_string(), CacheEntry::new(payload, now));
        self.size_bytes = new_size;
        debug!("Cache size is {} / {}", self.size_bytes, self.capacity_bytes);
        Admission::Admitted
    }

    // == Delete ==
    /// Removes a document. Returns whether anything was removed; deleting an
    /// absent id is not an error.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.entries.remove(id) {
            Some(entry) => {
                self.size_bytes -= entry.size();
                debug!(id, "Removed document from cache");
                debug!("Cache size is {} / {}", self.size_bytes, self.capacity_bytes);
                true
            }
            None => false,
        }
    }

    // == Sweep ==
    /// Removes every entry idle longer than `retention`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, retention: Duration) -> usize {
        self.sweep_at(retention, Instant::now())
    }

    pub(crate) fn sweep_at(&mut self, retention: Duration, now: Instant) -> usize {
        let mut removed = 0;
        let mut released = 0;

        self.entries.retain(|id, entry| {
            if entry.is_idle_longer_than(retention, now) {
                debug!(id = %id, "Sweeping idle document from cache");
                removed += 1;
                released += entry.size();
                false
            } else {
                true
            }
        });

        self.size_bytes -= released;
        removed
    }
}
