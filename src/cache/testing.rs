//! In-memory fetchers for cache tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use tokio::sync::Notify;
use url::Url;

use crate::cache::{resolve_document_url, Fetcher};
use crate::error::FetchError;

pub fn doc(len: usize) -> Bytes {
    Bytes::from(vec![b'd'; len])
}

/// Serves documents from a map and records every call.
#[derive(Default)]
pub struct MockFetcher {
    documents: HashMap<String, Bytes>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(Url, String)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, id: &str, payload: Bytes) -> Self {
        self.documents.insert(id.to_string(), payload);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, called)| called == id)
            .count()
    }

    pub fn base_urls(&self) -> Vec<Url> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, base_url: &Url, id: &str) -> Result<Bytes, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((base_url.clone(), id.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: resolve_document_url(base_url, id).to_string(),
                status: StatusCode::NOT_FOUND,
            })
    }
}

/// Blocks fetches of one id until released; every other id resolves at once.
pub struct GatedFetcher {
    gated_id: String,
    blocked: Notify,
    gate: Notify,
}

impl GatedFetcher {
    pub fn new(gated_id: &str) -> Self {
        Self {
            gated_id: gated_id.to_string(),
            blocked: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once a fetch of the gated id is waiting.
    pub async fn wait_until_blocked(&self) {
        self.blocked.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(&self, _base_url: &Url, id: &str) -> Result<Bytes, FetchError> {
        if id == self.gated_id {
            self.blocked.notify_one();
            self.gate.notified().await;
        }
        Ok(doc(8))
    }
}
