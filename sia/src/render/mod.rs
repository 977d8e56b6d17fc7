//! PDF page rasterization.
//!
//! A renderer opens a PDF and hands back a lazy, forward-only stream of JPEG
//! page images in page order. Pages are only rendered when the consumer pulls
//! them, and dropping the stream stops rendering and releases the document.
//!
//! Note: the pdfium backend binds to the pdfium shared library at runtime.
//! On macOS: brew install pdfium
//! On Linux: install libpdfium.so or point PDFIUM_LIBRARY_PATH at it

#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRenderer;

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::config::RenderConfig;
use crate::error::{Result, SiaError};

/// One rendered page, JPEG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number.
    pub page_number: usize,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Items are `Err(SiaError::Render { .. })` for pages that failed to render;
/// the stream keeps going after such an item.
pub type PageStream = BoxStream<'static, Result<PageImage>>;

pub struct RenderedPages {
    pub page_count: usize,
    pub pages: PageStream,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load the document and return its page count plus a lazy page stream.
    async fn open(&self, pdf: Arc<[u8]>) -> Result<RenderedPages>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub target_width: u32,
    pub jpeg_quality: u8,
}

impl From<&RenderConfig> for RenderSettings {
    fn from(config: &RenderConfig) -> Self {
        Self {
            target_width: config.target_width,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Pixel size of a page scaled to `target_width`, keeping its aspect ratio.
pub fn target_dimensions(page_width: f32, page_height: f32, target_width: u32) -> (u32, u32) {
    if page_width <= 0.0 || page_height <= 0.0 {
        return (target_width, target_width);
    }
    let height = (target_width as f32 / page_width * page_height).round();
    (target_width, (height as u32).max(1))
}

/// Encode raw RGBA pixels as JPEG. The alpha channel is dropped.
pub fn encode_jpeg(rgba: Vec<u8>, width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        SiaError::Read(format!("Bitmap buffer does not match {width}x{height}"))
    })?;
    let rgb = DynamicImage::ImageRgba8(image).to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(|e| SiaError::Read(format!("Failed to encode image: {e}")))?;
    Ok(buffer.into_inner())
}

/// Renderer used when no rasterization backend is compiled in or it fails to load.
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for UnavailableRenderer {
    async fn open(&self, _pdf: Arc<[u8]>) -> Result<RenderedPages> {
        Err(SiaError::Read(format!(
            "PDF rendering unavailable: {}",
            self.reason
        )))
    }
}

pub fn default_renderer(config: &RenderConfig) -> Arc<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        Arc::new(PdfiumRenderer::new(config))
    }
    #[cfg(not(feature = "pdfium"))]
    {
        let _ = config;
        tracing::warn!("Built without the pdfium feature - PDF files cannot be processed");
        Arc::new(UnavailableRenderer::new("built without the pdfium feature"))
    }
}
