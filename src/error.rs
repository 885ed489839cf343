//! Error types for the render service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Failures on the document retrieval path (`DocumentCache::get`).
///
/// Every variant is handed back to the caller unchanged; the cache never
/// retries and never substitutes a stale copy.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The cache has no base location yet
    #[error("document cache is not configured with a base location")]
    NotConfigured,

    /// Documents cannot be addressed by an empty identifier
    #[error("document identifier must not be empty")]
    EmptyIdentifier,

    /// The remote store could not be reached
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote store answered with a non-success status
    #[error("remote store returned status {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// The response body could not be read completely
    #[error("failed to read response body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// == Render Error Enum ==
/// Failures reported by a rendering engine.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The binary was built without a rendering backend
    #[error("no rendering engine is available")]
    Unavailable,

    /// The document buffer could not be opened
    #[error("could not open document: {0}")]
    Open(String),

    /// The page does not exist in the document
    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    /// Fit-to-rectangle rendering with a zero-sized box
    #[error("neither max width nor max height can be zero")]
    EmptyRectangle,

    /// The engine failed while rendering or encoding
    #[error("render failed: {0}")]
    Engine(String),
}

// == Service Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested page is not contained in the document
    #[error("Page not found: {0}")]
    PageNotFound(u32),

    /// Document could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Document could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::PageNotFound(_) => (
                StatusCode::NOT_FOUND,
                "The requested page is not contained in this document.".to_string(),
            ),
            ServiceError::Fetch(err) => {
                warn!(error = %err, "Could not fetch document");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not fetch the requested document.".to_string(),
                )
            }
            ServiceError::Render(RenderError::Unavailable) => (
                StatusCode::NOT_IMPLEMENTED,
                "Rendering is not available on this server.".to_string(),
            ),
            ServiceError::Render(RenderError::PageOutOfRange { page, .. }) => {
                return ServiceError::PageNotFound(*page).into_response();
            }
            ServiceError::Render(err) => {
                warn!(error = %err, "Error rendering document");
                (
                    StatusCode::BAD_REQUEST,
                    "Could not render the requested document.".to_string(),
                )
            }
            ServiceError::Internal(msg) => {
                warn!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ServiceError>;
