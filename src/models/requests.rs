//! Request DTOs for the render service API
//!
//! Query parameters and path values of incoming requests.

use serde::Deserialize;

use crate::render::{MAX_ZOOM, MIN_ZOOM};

/// Query string of the render endpoints (`?z=` or `?w=&h=`)
///
/// Values are kept as strings so that each one can be rejected with its own
/// message. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderQuery {
    /// Zoom factor
    #[serde(default)]
    pub z: Option<String>,
    /// Maximum width in pixels
    #[serde(default)]
    pub w: Option<String>,
    /// Maximum height in pixels
    #[serde(default)]
    pub h: Option<String>,
}

/// How a page should be scaled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTarget {
    /// Scale by a fixed factor
    Zoom(f32),
    /// Fit into a box, keeping the aspect ratio
    Fit { width: u32, height: u32 },
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RenderQuery {
    /// Validates the query and picks the render target. Zoom wins when both
    /// forms are given.
    ///
    /// Returns an error message if validation fails.
    pub fn target(&self) -> Result<RenderTarget, String> {
        if let Some(z) = present(&self.z) {
            let zoom: f32 = z
                .parse()
                .map_err(|_| "The requested zoom level can not be processed.".to_string())?;
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                return Err("The requested zoom is not in the appropriate range.".to_string());
            }
            return Ok(RenderTarget::Zoom(zoom));
        }

        match (present(&self.w), present(&self.h)) {
            (Some(w), Some(h)) => Ok(RenderTarget::Fit {
                width: parse_param(w)?,
                height: parse_param(h)?,
            }),
            _ => Err("No handler for request available.".to_string()),
        }
    }
}

/// Parses a fit dimension; zero is rejected along with non-numbers.
fn parse_param(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("The request parameter {} can not be processed.", value))
}

/// Parses a 1-based page number from a path segment.
pub fn parse_page_number(value: &str) -> Result<u32, String> {
    let valid = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
    match value.parse::<u32>() {
        Ok(page) if valid && page > 0 => Ok(page),
        _ => Err(format!(
            "The request parameter {} can not be processed.",
            value
        )),
    }
}
