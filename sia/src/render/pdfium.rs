use std::sync::Arc;

use async_trait::async_trait;
use pdfium_render::prelude::*;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::{encode_jpeg, target_dimensions, PageImage, PageRenderer, RenderSettings, RenderedPages};
use crate::config::RenderConfig;
use crate::error::{Result, SiaError};

/// Renders pages with pdfium on a dedicated blocking worker.
///
/// The worker owns the loaded document and renders one page per pull request
/// from the stream. When the stream is dropped the request channel closes,
/// the worker returns and the document is released.
pub struct PdfiumRenderer {
    settings: RenderSettings,
    library_path: Option<String>,
}

impl PdfiumRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            settings: RenderSettings::from(config),
            library_path: config.pdfium_library_path.clone(),
        }
    }
}

#[async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn open(&self, pdf: Arc<[u8]>) -> Result<RenderedPages> {
        let (count_tx, count_rx) = oneshot::channel();
        let (request_tx, request_rx) = mpsc::channel::<()>(1);
        let (page_tx, mut page_rx) = mpsc::channel::<Result<PageImage>>(1);

        let settings = self.settings;
        let library_path = self.library_path.clone();
        tokio::task::spawn_blocking(move || {
            render_worker(pdf, library_path, settings, count_tx, request_rx, page_tx)
        });

        let page_count = count_rx
            .await
            .map_err(|_| SiaError::Read("PDF render worker exited unexpectedly".to_string()))??;

        info!(page_count, "PDF loaded");

        let pages = async_stream::stream! {
            for _ in 0..page_count {
                if request_tx.send(()).await.is_err() {
                    break;
                }
                match page_rx.recv().await {
                    Some(page) => yield page,
                    None => {
                        yield Err(SiaError::Read(
                            "PDF render worker exited unexpectedly".to_string(),
                        ));
                        break;
                    }
                }
            }
        };

        Ok(RenderedPages {
            page_count,
            pages: Box::pin(pages),
        })
    }
}

fn bind_pdfium(library_path: Option<&str>) -> Result<Pdfium> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            .or_else(|_| Pdfium::bind_to_system_library()),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| SiaError::Read(format!("Failed to initialize pdfium: {e}")))?;

    Ok(Pdfium::new(bindings))
}

fn render_worker(
    pdf: Arc<[u8]>,
    library_path: Option<String>,
    settings: RenderSettings,
    count_tx: oneshot::Sender<Result<usize>>,
    mut request_rx: mpsc::Receiver<()>,
    page_tx: mpsc::Sender<Result<PageImage>>,
) {
    let pdfium = match bind_pdfium(library_path.as_deref()) {
        Ok(pdfium) => pdfium,
        Err(e) => {
            let _ = count_tx.send(Err(e));
            return;
        }
    };

    let document = match pdfium.load_pdf_from_byte_slice(&pdf, None) {
        Ok(document) => document,
        Err(e) => {
            let _ = count_tx.send(Err(SiaError::Read(format!("Failed to load PDF: {e}"))));
            return;
        }
    };

    let pages = document.pages();
    let page_count = pages.len() as usize;
    if count_tx.send(Ok(page_count)).is_err() {
        return;
    }

    let mut index = 0;
    while index < page_count {
        if request_rx.blocking_recv().is_none() {
            debug!(rendered = index, page_count, "Page stream dropped, stopping render worker");
            break;
        }

        let page = render_page(pages, index, settings).map_err(|message| SiaError::Render {
            page: index + 1,
            message,
        });
        if page_tx.blocking_send(page).is_err() {
            break;
        }
        index += 1;
    }
}

fn render_page(
    pages: &PdfPages,
    index: usize,
    settings: RenderSettings,
) -> std::result::Result<PageImage, String> {
    let page_index = index
        .try_into()
        .map_err(|_| format!("page index {index} out of range"))?;
    let page = pages
        .get(page_index)
        .map_err(|e| format!("Failed to get page: {e}"))?;

    let (width, height) = target_dimensions(
        page.width().value,
        page.height().value,
        settings.target_width,
    );

    let config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_target_height(height as i32)
        .render_form_data(true)
        .render_annotations(true);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| format!("Failed to render page: {e}"))?;

    let bitmap_width = bitmap.width() as u32;
    let bitmap_height = bitmap.height() as u32;
    let data = encode_jpeg(
        bitmap.as_rgba_bytes(),
        bitmap_width,
        bitmap_height,
        settings.jpeg_quality,
    )
    .map_err(|e| e.to_string())?;

    Ok(PageImage {
        page_number: index + 1,
        width: bitmap_width,
        height: bitmap_height,
        data,
    })
}
