//! Document Cache Module
//!
//! Shared, lock-guarded front of the cache store. Resolves misses through a
//! `Fetcher` and offers the result for admission.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use url::Url;

use crate::cache::{Admission, CacheStore, Fetcher};
use crate::error::FetchError;

// == Fetch Serialization ==
/// How concurrent `get` calls are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchSerialization {
    /// One `get` at a time across the whole cache, fetch included
    #[default]
    Global,
    /// One `get` at a time per document id; other ids proceed in parallel
    PerDocument,
}

impl FromStr for FetchSerialization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per_document" | "per-document" => Ok(Self::PerDocument),
            other => Err(format!("unknown fetch serialization mode: {}", other)),
        }
    }
}

// == Document Cache ==
/// Thread-safe document cache shared by handlers and the sweeper.
pub struct DocumentCache {
    /// Index, size counter and configuration
    store: RwLock<CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    serialization: FetchSerialization,
    /// Held for a whole `get` in `Global` mode
    global: Mutex<()>,
    /// Per-id locks for `PerDocument` mode, removed when no caller holds them
    in_flight: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentCache {
    // == Constructor ==
    /// Creates an empty, unconfigured cache using global serialization.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            store: RwLock::new(CacheStore::new()),
            fetcher,
            serialization: FetchSerialization::default(),
            global: Mutex::new(()),
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    pub fn with_serialization(mut self, serialization: FetchSerialization) -> Self {
        self.serialization = serialization;
        self
    }

    pub fn serialization(&self) -> FetchSerialization {
        self.serialization
    }

    // == Configure ==
    /// Sets base location and capacity. Meant to run once before serving.
    pub async fn configure(&self, base_url: Url, capacity_bytes: u64) {
        self.store.write().await.configure(base_url, capacity_bytes);
    }

    // == Get ==
    /// Returns the document, fetching it on a miss.
    ///
    /// Fetched bytes are returned even when the cache declines to keep them.
    /// Fetch failures are returned unchanged and nothing is cached.
    pub async fn get(&self, id: &str) -> Result<Bytes, FetchError> {
        if id.is_empty() {
            return Err(FetchError::EmptyIdentifier);
        }
        debug!(id, "Get document");

        match self.serialization {
            FetchSerialization::Global => {
                let _serial = self.global.lock().await;
                self.get_or_fetch(id).await
            }
            FetchSerialization::PerDocument => {
                let in_flight = self.join_in_flight(id);
                let _serial = in_flight.lock.lock().await;
                self.get_or_fetch(id).await
            }
        }
    }

    async fn get_or_fetch(&self, id: &str) -> Result<Bytes, FetchError> {
        let base_url = {
            let mut store = self.store.write().await;
            if let Some(payload) = store.lookup(id) {
                return Ok(payload);
            }
            store.base_url().cloned().ok_or(FetchError::NotConfigured)?
        };

        // Store lock is released while the fetch is in progress
        let payload = self.fetcher.fetch(&base_url, id).await?;

        let admission = self.store.write().await.admit(id, payload.clone());
        if admission == Admission::Declined {
            debug!(id, "Serving document without caching it");
        }
        Ok(payload)
    }

    fn in_flight_map(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn join_in_flight<'a>(&'a self, id: &'a str) -> InFlight<'a> {
        let lock = self
            .in_flight_map()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        InFlight {
            cache: self,
            id,
            lock,
        }
    }

    // == Delete ==
    /// Drops a document from the cache. Absent ids are ignored.
    pub async fn delete(&self, id: &str) -> bool {
        debug!(id, "Remove document");
        self.store.write().await.delete(id)
    }

    // == Sweep ==
    /// Removes documents idle longer than `retention`; returns how many.
    pub async fn sweep(&self, retention: Duration) -> usize {
        self.store.write().await.sweep(retention)
    }

    // == Inspection ==
    pub async fn size_bytes(&self) -> u64 {
        self.store.read().await.size_bytes()
    }

    pub async fn capacity_bytes(&self) -> u64 {
        self.store.read().await.capacity_bytes()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.store.read().await.contains(id)
    }
}

// == In-Flight Guard ==
/// Membership in a per-id lock; the map entry goes away with its last member.
struct InFlight<'a> {
    cache: &'a DocumentCache,
    id: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut map = self.cache.in_flight_map();
        // Clones are only taken under the map lock: the map and this guard
        // hold the last two references.
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(self.id);
        }
    }
}
