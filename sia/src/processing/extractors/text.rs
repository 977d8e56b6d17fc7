use crate::error::Result;
use crate::models::ExtractionResult;

/// Extractor for plain-text formats (txt, csv, py, json): the content is the text.
pub struct TextExtractor;

impl TextExtractor {
    pub fn extract(bytes: &[u8]) -> Result<ExtractionResult> {
        let bytes = strip_bom(bytes);
        let text = String::from_utf8_lossy(bytes).into_owned();
        Ok(ExtractionResult::new(text))
    }
}

/// Strip UTF-8 BOM if present
fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}
