//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::cache::{FetchSerialization, MEGABYTE};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_delay: u64,
    /// Sweeper interval in seconds
    pub cleanup_interval: u64,
    /// Idle time in seconds after which a cached document is swept
    pub retention: u64,
    /// Base URL of the remote document store
    pub doc_url: String,
    /// Cache capacity in mebibytes
    pub cache_size_mb: u64,
    /// Serialization of concurrent cache lookups
    pub fetch_serialization: FetchSerialization,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Reads the sweeper interval in seconds. Zero is not a valid tick period and
/// falls back to the default like any unparsable value.
fn parse_interval(key: &str, default: u64) -> u64 {
    parse_env(key).filter(|secs| *secs > 0).unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_HOST` - Listen address (default: 127.0.0.1)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SHUTDOWN_DELAY` - Graceful shutdown limit in seconds (default: 5)
    /// - `CLEANUP_INTERVAL` - Sweeper frequency in seconds (default: 180)
    /// - `RETENTION` - Idle retention in seconds (default: 600)
    /// - `DOC_URL` - Document store base URL (default: http://localhost:9000/)
    /// - `CACHE_SIZE_MB` - Cache capacity in MiB (default: 500)
    /// - `FETCH_SERIALIZATION` - `global` or `per_document` (default: global)
    /// - `LOG_FORMAT` - `json` for JSON logs, anything else for text
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            shutdown_delay: parse_env("SHUTDOWN_DELAY").unwrap_or(defaults.shutdown_delay),
            cleanup_interval: parse_interval("CLEANUP_INTERVAL", defaults.cleanup_interval),
            retention: parse_env("RETENTION").unwrap_or(defaults.retention),
            doc_url: env::var("DOC_URL").unwrap_or(defaults.doc_url),
            cache_size_mb: parse_env("CACHE_SIZE_MB").unwrap_or(defaults.cache_size_mb),
            fetch_serialization: parse_env("FETCH_SERIALIZATION")
                .unwrap_or(defaults.fetch_serialization),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Parses `doc_url` into the cache's base location.
    pub fn doc_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.doc_url)
    }

    pub fn cache_size_bytes(&self) -> u64 {
        self.cache_size_mb.saturating_mul(MEGABYTE)
    }

    pub fn shutdown_delay(&self) -> Duration {
        Duration::from_secs(self.shutdown_delay)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention)
    }

    /// `host:port` string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            shutdown_delay: 5,
            cleanup_interval: 180,
            retention: 600,
            doc_url: "http://localhost:9000/".to_string(),
            cache_size_mb: 500,
            fetch_serialization: FetchSerialization::Global,
            json_logs: false,
        }
    }
}
