//! Document Fetcher Module
//!
//! Retrieves raw document bytes from the remote document store.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;

// == Fetcher Trait ==
/// Source of document bytes for cache misses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches document `id` relative to `base_url`. One attempt, no retry.
    async fn fetch(&self, base_url: &Url, id: &str) -> Result<Bytes, FetchError>;
}

// == URL Resolution ==
/// Appends `id` to the path of `base_url`.
///
/// The id is appended verbatim, so the base normally ends with a slash:
/// `http://host/docs/` + `abc` gives `http://host/docs/abc`.
pub fn resolve_document_url(base_url: &Url, id: &str) -> Url {
    let mut url = base_url.clone();
    let path = format!("{}{}", base_url.path(), id);
    url.set_path(&path);
    url
}

// == HTTP Fetcher ==
/// Fetches documents with a single HTTP GET per miss.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, base_url: &Url, id: &str) -> Result<Bytes, FetchError> {
        let url = resolve_document_url(base_url, id);
        debug!(url = %url, "Fetching document");

        // The response owns the connection; every early return drops it.
        let response = self
            .client
            .get(url.clone())
            .header(header::CONNECTION, "close")
            .send()
            .await
            .map_err(|source| {
                debug!(url = %url, error = %source, "Error while downloading document");
                FetchError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            info!(url = %url, status = %status, "Error while downloading document");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let data = response.bytes().await.map_err(|source| {
            debug!(url = %url, error = %source, "Error while reading response body");
            FetchError::Read {
                url: url.to_string(),
                source,
            }
        })?;

        debug!(url = %url, size = data.len(), "Fetched document");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_appends_to_root() {
        let url = resolve_document_url(&base("http://localhost:9000/"), "abc-123");
        assert_eq!(url.as_str(), "http://localhost:9000/abc-123");
    }

    #[test]
    fn test_resolve_appends_to_nested_path() {
        let url = resolve_document_url(&base("http://store.local/docs/"), "abc");
        assert_eq!(url.as_str(), "http://store.local/docs/abc");
    }

    #[test]
    fn test_resolve_without_trailing_slash_appends_verbatim() {
        let url = resolve_document_url(&base("http://store.local/docs"), "abc");
        assert_eq!(url.path(), "/docsabc");
    }

    #[test]
    fn test_resolve_keeps_query() {
        let url = resolve_document_url(&base("http://store.local/docs/?token=t"), "abc");
        assert_eq!(url.path(), "/docs/abc");
        assert_eq!(url.query(), Some("token=t"));
    }

    /// Answers one connection with `response` and returns the request head
    /// it received, lowercased.
    async fn serve_once(response: &'static [u8]) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_ascii_lowercase()
        });

        (base(&format!("http://{}/docs/", addr)), server)
    }

    #[tokio::test]
    async fn test_fetch_success_closes_connection() {
        let (url, server) =
            serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").await;

        let data = HttpFetcher::new().fetch(&url, "abc").await.unwrap();
        assert_eq!(data, Bytes::from_static(b"hello"));

        let request = server.await.unwrap();
        assert!(request.starts_with("get /docs/abc http/1.1"));
        assert!(request.contains("connection: close"));
    }

    #[tokio::test]
    async fn test_fetch_truncated_body_is_read_error() {
        let (url, server) =
            serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n0123456789").await;

        let result = HttpFetcher::new().fetch(&url, "abc").await;
        assert!(matches!(result, Err(FetchError::Read { .. })));

        let request = server.await.unwrap();
        assert!(request.contains("connection: close"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let (url, server) =
            serve_once(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n").await;

        let result = HttpFetcher::new().fetch(&url, "abc").await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let fetcher = HttpFetcher::new();
        // Port 1 on loopback refuses connections
        let result = fetcher.fetch(&base("http://127.0.0.1:1/"), "doc").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
