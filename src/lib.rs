//! Render Service - Renders pages of remotely stored documents
//!
//! Documents are fetched from a document store on first use and kept in a
//! size-bounded in-memory cache that drops entries after an idle period.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{DocumentCache, FetchSerialization};
pub use config::Config;
pub use tasks::spawn_sweeper;
