//! Cache Module
//!
//! Size-bounded, idle-swept in-memory cache of remotely fetched documents.

mod document_cache;
mod entry;
mod fetcher;
mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use document_cache::{DocumentCache, FetchSerialization};
pub use entry::CacheEntry;
pub use fetcher::{resolve_document_url, Fetcher, HttpFetcher};
pub use store::{Admission, CacheStore};

// == Public Constants ==
/// Bytes per mebibyte, used to convert the configured cache size
pub const MEGABYTE: u64 = 1024 * 1024;
