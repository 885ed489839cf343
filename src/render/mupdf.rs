//! MuPDF rendering backend.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap};
use tracing::debug;

use super::{PageInfo, RenderEngine, Renderer};
use crate::error::RenderError;

const PDF_MAGIC: &str = "application/pdf";

fn engine_error(err: mupdf::Error) -> RenderError {
    RenderError::Engine(err.to_string())
}

// == Engine ==
/// Opens PDF buffers with MuPDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfEngine;

impl MupdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RenderEngine for MupdfEngine {
    fn open(&self, document: Bytes) -> Result<Box<dyn Renderer>, RenderError> {
        debug!(size = document.len(), "Opening document");
        let doc = Document::from_bytes(&document, PDF_MAGIC)
            .map_err(|e| RenderError::Open(e.to_string()))?;
        let page_count = doc.page_count().map_err(engine_error)?.max(0) as u32;
        Ok(Box::new(MupdfRenderer { doc, page_count }))
    }
}

// == Renderer ==
struct MupdfRenderer {
    doc: Document,
    page_count: u32,
}

impl MupdfRenderer {
    fn load_page(&self, page: u32) -> Result<Page, RenderError> {
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }
        self.doc
            .load_page(page as i32 - 1)
            .map_err(engine_error)
    }
}

impl Renderer for MupdfRenderer {
    fn page_count(&self) -> Result<u32, RenderError> {
        Ok(self.page_count)
    }

    fn page_info(&self, page: u32) -> Result<PageInfo, RenderError> {
        let bounds = self.load_page(page)?.bounds().map_err(engine_error)?;
        Ok(PageInfo {
            width: bounds.x1 - bounds.x0,
            height: bounds.y1 - bounds.y0,
        })
    }

    fn render_zoom(&self, page: u32, zoom: f32) -> Result<Vec<u8>, RenderError> {
        debug!(page, zoom, "Rendering page");
        let page = self.load_page(page)?;
        let matrix = Matrix::new_scale(zoom, zoom);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)
            .map_err(engine_error)?;
        encode_png(&pixmap)
    }
}

/// Number of pixels in a `width` x `height` image.
fn pixel_count(width: u32, height: u32) -> Result<usize, RenderError> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|pixels| pixels.checked_mul(3).is_some())
        .ok_or_else(|| RenderError::Engine(format!("image of {}x{} is too large", width, height)))
}

/// Encodes an RGB pixmap as PNG.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;
    let pixels = pixel_count(width, height)?;

    let mut rgb = Vec::with_capacity(pixels * 3);
    for pixel in samples.chunks_exact(n).take(pixels) {
        rgb.extend_from_slice(&pixel[..3]);
    }

    let img = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| RenderError::Engine("pixmap does not match its dimensions".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| RenderError::Engine(e.to_string()))?;
    Ok(output)
}
