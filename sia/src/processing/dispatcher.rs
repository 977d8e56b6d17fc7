use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SiaError};
use crate::models::{ExtractionResult, FileKind, ProjectType, SelectedFile};
use crate::ocr::OcrEngineFactory;
use crate::render::PageRenderer;
use crate::validation::Validator;

use super::extractors::{DocxExtractor, PdfExtractor, PptxExtractor, TextExtractor, XlsxExtractor};
use super::ProgressReporter;

/// Decide which extractor handles `file`, by name suffix only.
pub fn classify(file: Option<&SelectedFile>) -> Result<(&SelectedFile, FileKind)> {
    let file = file.ok_or(SiaError::MissingFile)?;
    let kind = file.kind().ok_or(SiaError::UnsupportedFormat)?;
    Ok((file, kind))
}

/// Routes a classified file to exactly one extractor.
pub struct Dispatcher {
    pdf: PdfExtractor,
}

impl Dispatcher {
    pub fn new(renderer: Arc<dyn PageRenderer>, ocr: Arc<dyn OcrEngineFactory>) -> Self {
        Self {
            pdf: PdfExtractor::new(renderer, ocr),
        }
    }

    pub async fn extract(
        &self,
        kind: FileKind,
        file: &SelectedFile,
        validator: &Validator,
        project_type: &ProjectType,
        progress: &ProgressReporter,
    ) -> Result<ExtractionResult> {
        debug!(file = %file.name(), %kind, "Dispatching to extractor");

        match kind {
            FileKind::Text => TextExtractor::extract(file.bytes()),
            FileKind::Docx => DocxExtractor::extract(file.bytes()),
            FileKind::Pptx => PptxExtractor::extract(file.shared_bytes()).await,
            FileKind::Xlsx => XlsxExtractor::extract(file.bytes()),
            FileKind::Pdf => {
                self.pdf
                    .extract(file, validator, project_type, progress)
                    .await
            }
        }
    }
}
