use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::error::{Result, SiaError};
use crate::models::{ExtractionResult, ProjectType, RunEvent, SelectedFile};
use crate::ocr::{OcrEngine, OcrEngineFactory};
use crate::processing::ProgressReporter;
use crate::render::{PageRenderer, RenderedPages};
use crate::validation::{ValidationOutcome, Validator};

/// OCR extraction for scanned PDFs.
///
/// Pages are rendered lazily and recognized one at a time. Before each page
/// the running count is checked against the maximum only, so a document that
/// is already too long stops costing OCR time.
pub struct PdfExtractor {
    renderer: Arc<dyn PageRenderer>,
    ocr: Arc<dyn OcrEngineFactory>,
}

impl PdfExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, ocr: Arc<dyn OcrEngineFactory>) -> Self {
        Self { renderer, ocr }
    }

    pub async fn extract(
        &self,
        file: &SelectedFile,
        validator: &Validator,
        project_type: &ProjectType,
        progress: &ProgressReporter,
    ) -> Result<ExtractionResult> {
        if !file.is_pdf() {
            return Err(SiaError::InvalidFormat("Invalid PDF File.".to_string()));
        }

        let mut engine = self.ocr.create_engine().await?;
        let result = self
            .recognize_pages(engine.as_mut(), file, validator, project_type, progress)
            .await;
        engine.terminate().await;

        result
    }

    async fn recognize_pages(
        &self,
        engine: &mut dyn OcrEngine,
        file: &SelectedFile,
        validator: &Validator,
        project_type: &ProjectType,
        progress: &ProgressReporter,
    ) -> Result<ExtractionResult> {
        let RenderedPages {
            page_count,
            mut pages,
        } = self.renderer.open(file.shared_bytes()).await?;

        info!(file = %file.name(), pages = page_count, "Processing PDF");
        progress.emit(RunEvent::Processing { pages: page_count });

        let mut text = String::new();
        let mut character_count = 0;
        let mut done = 0;
        let mut received = 0;
        let mut stopped_early = false;

        while let Some(rendered) = pages.next().await {
            received += 1;
            let page = match rendered {
                Ok(page) => page,
                Err(SiaError::Render { page, message }) => {
                    warn!(page, error = %message, "Skipping page that failed to render");
                    progress.emit(RunEvent::PageRenderFailed { page, message });
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let ValidationOutcome::Rejected(reason) =
                validator.validate(character_count, project_type, false)
            {
                info!(
                    page = page.page_number,
                    character_count,
                    reason = %reason,
                    "Stopping OCR early"
                );
                stopped_early = true;
                break;
            }

            let recognized = engine.recognize(&page).await?;
            character_count += recognized.chars().count();
            text.push_str(&recognized);
            done += 1;

            debug!(page = page.page_number, character_count, "Page recognized");
            progress.emit(RunEvent::CharacterCount {
                count: character_count,
            });
            progress.emit(RunEvent::PageCompleted {
                done,
                total: page_count,
            });
        }

        // A stream that ends short of the page count lost pages, not text.
        if !stopped_early && received < page_count {
            return Err(SiaError::Read(format!(
                "PDF rendering stopped after {received} of {page_count} pages"
            )));
        }

        Ok(ExtractionResult::new(text))
    }
}
