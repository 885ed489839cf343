//! Render Module
//!
//! Interface to the engine that turns a document buffer into page images.
//! Pages are numbered from 1.

#[cfg(feature = "mupdf")]
mod mupdf;
#[cfg(test)]
pub(crate) mod testing;

use bytes::Bytes;
use serde::Serialize;

use crate::error::RenderError;

#[cfg(feature = "mupdf")]
pub use self::mupdf::MupdfEngine;

/// Lowest accepted zoom factor
pub const MIN_ZOOM: f32 = 0.05;
/// Highest accepted zoom factor
pub const MAX_ZOOM: f32 = 4.0;

// == Page Info ==
/// Page dimensions in document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageInfo {
    pub width: f32,
    pub height: f32,
}

// == Renderer ==
/// An opened document.
pub trait Renderer {
    fn page_count(&self) -> Result<u32, RenderError>;

    fn page_info(&self, page: u32) -> Result<PageInfo, RenderError>;

    /// Renders `page` scaled by `zoom` and returns the encoded PNG.
    fn render_zoom(&self, page: u32, zoom: f32) -> Result<Vec<u8>, RenderError>;

    /// Renders `page` as large as fits into `max_width` x `max_height`,
    /// keeping the aspect ratio.
    fn render_fit(&self, page: u32, max_width: u32, max_height: u32) -> Result<Vec<u8>, RenderError> {
        if max_width == 0 || max_height == 0 {
            return Err(RenderError::EmptyRectangle);
        }
        let info = self.page_info(page)?;
        self.render_zoom(page, fit_zoom(info, max_width, max_height))
    }
}

/// Zoom factor that fits a page into the given box.
pub fn fit_zoom(info: PageInfo, max_width: u32, max_height: u32) -> f32 {
    let zoom_x = max_width as f32 / info.width;
    let zoom_y = max_height as f32 / info.height;
    zoom_x.min(zoom_y)
}

// == Render Engine ==
/// Opens document buffers. Shared by all handlers.
pub trait RenderEngine: Send + Sync {
    fn open(&self, document: Bytes) -> Result<Box<dyn Renderer>, RenderError>;
}

/// Engine used when the binary is built without a rendering backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl RenderEngine for UnavailableEngine {
    fn open(&self, _document: Bytes) -> Result<Box<dyn Renderer>, RenderError> {
        Err(RenderError::Unavailable)
    }
}
