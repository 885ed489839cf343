//! API Module
//!
//! HTTP handlers and routing for the render service REST API.
//!
//! # Endpoints
//! - `GET /` - Service name
//! - `GET /health` - Health check endpoint
//! - `GET /renderservice/:uuid/numpages` - Page count
//! - `GET /renderservice/:uuid/:pagenr/pageinfo` - Page dimensions
//! - `GET /renderservice/:uuid/:pagenr` - Render a cached document page
//! - `POST /renderservice/:pagenr` - Render a page of the request body
//! - `DELETE /renderservice/:uuid` - Drop a document from the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
