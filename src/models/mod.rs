//! Request and Response models for the render service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query parsing and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{parse_page_number, RenderQuery, RenderTarget};
pub use responses::{ErrorResponse, HealthResponse};
