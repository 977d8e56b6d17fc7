//! DOCX extractor using zip + quick-xml

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::push_reference;
use crate::error::{Result, SiaError};
use crate::models::ExtractionResult;

const DOCUMENT_PART: &str = "word/document.xml";

/// Raw-text DOCX extraction: formatting is discarded and every paragraph is
/// followed by a blank line.
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn extract(bytes: &[u8]) -> Result<ExtractionResult> {
        let xml = Self::read_document_xml(bytes).map_err(Self::read_error)?;
        let text = Self::extract_text_from_xml(&xml).map_err(Self::read_error)?;
        Ok(ExtractionResult::new(text))
    }

    fn read_error(message: String) -> SiaError {
        SiaError::Read(format!("Error: {message}"))
    }

    fn read_document_xml(bytes: &[u8]) -> std::result::Result<String, String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
        let mut file = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| format!("Could not find {DOCUMENT_PART}: {e}"))?;

        let mut xml = String::new();
        file.read_to_string(&mut xml).map_err(|e| e.to_string())?;
        Ok(xml)
    }

    fn extract_text_from_xml(xml: &str) -> std::result::Result<String, String> {
        let mut reader = Reader::from_str(xml);

        let mut text = String::new();
        let mut in_run = false;
        let mut in_text_element = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"w:r" => in_run = true,
                    b"w:t" => in_text_element = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // w:tab outside a run is a tab stop definition, not content
                    b"w:tab" if in_run => text.push('\t'),
                    b"w:br" | b"w:cr" if in_run => text.push('\n'),
                    b"w:p" => text.push_str("\n\n"),
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_text_element {
                        let decoded = e.decode().map_err(|e| e.to_string())?;
                        text.push_str(&decoded);
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if in_text_element {
                        push_reference(&mut text, &e)?;
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:r" => in_run = false,
                    b"w:t" => in_text_element = false,
                    b"w:p" => text.push_str("\n\n"),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("Error parsing {DOCUMENT_PART}: {e}")),
                _ => {}
            }
            buf.clear();
        }

        Ok(text)
    }
}
