//! Text-based stand-in engine for handler tests.
//!
//! A document is the text `FAKE <pages>`; every page is 100 x 200 and renders
//! to `png page=<page> zoom=<zoom>`.

use bytes::Bytes;

use crate::error::RenderError;
use crate::render::{PageInfo, RenderEngine, Renderer};

pub fn fake_document(pages: u32) -> Bytes {
    Bytes::from(format!("FAKE {}", pages))
}

#[derive(Debug, Default)]
pub struct FakeEngine;

impl RenderEngine for FakeEngine {
    fn open(&self, document: Bytes) -> Result<Box<dyn Renderer>, RenderError> {
        let text = std::str::from_utf8(&document).map_err(|e| RenderError::Open(e.to_string()))?;
        let pages = text
            .strip_prefix("FAKE ")
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| RenderError::Open("not a fake document".to_string()))?;
        Ok(Box::new(FakeRenderer { pages }))
    }
}

struct FakeRenderer {
    pages: u32,
}

impl Renderer for FakeRenderer {
    fn page_count(&self) -> Result<u32, RenderError> {
        Ok(self.pages)
    }

    fn page_info(&self, page: u32) -> Result<PageInfo, RenderError> {
        if page == 0 || page > self.pages {
            return Err(RenderError::PageOutOfRange {
                page,
                count: self.pages,
            });
        }
        Ok(PageInfo {
            width: 100.0,
            height: 200.0,
        })
    }

    fn render_zoom(&self, page: u32, zoom: f32) -> Result<Vec<u8>, RenderError> {
        self.page_info(page)?;
        Ok(format!("png page={} zoom={}", page, zoom).into_bytes())
    }
}
