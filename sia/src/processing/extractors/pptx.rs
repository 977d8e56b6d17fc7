//! PPTX extractor using zip + quick-xml

use futures::future::try_join_all;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::{Arc, OnceLock};
use tracing::debug;
use zip::ZipArchive;

use super::push_reference;
use crate::error::{Result, SiaError};
use crate::models::ExtractionResult;

fn slide_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^ppt/slides/slide\d+\.xml$").expect("valid regex"))
}

pub struct PptxExtractor;

impl PptxExtractor {
    /// Parses every slide on its own blocking task; one failing slide fails
    /// the whole file. Slides keep archive order in the output.
    pub async fn extract(bytes: Arc<[u8]>) -> Result<ExtractionResult> {
        let slide_names = Self::slide_entries(&bytes)?;
        debug!(slides = slide_names.len(), "Extracting PPTX slides");

        let slides = try_join_all(slide_names.into_iter().map(|name| {
            let bytes = Arc::clone(&bytes);
            tokio::task::spawn_blocking(move || Self::extract_slide(&bytes, &name))
        }))
        .await
        .map_err(|e| Self::read_error(format!("slide task failed: {e}")))?
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        Ok(ExtractionResult::new(slides.join("\n\n")))
    }

    fn open(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
        ZipArchive::new(Cursor::new(bytes)).map_err(Self::read_error)
    }

    fn read_error(e: impl std::fmt::Display) -> SiaError {
        SiaError::Read(format!("Failed to read PPTX file: {e}"))
    }

    fn slide_entries(bytes: &[u8]) -> Result<Vec<String>> {
        let archive = Self::open(bytes)?;
        Ok((0..archive.len())
            .filter_map(|index| archive.name_for_index(index))
            .filter(|name| slide_pattern().is_match(name))
            .map(String::from)
            .collect())
    }

    fn extract_slide(bytes: &[u8], slide_path: &str) -> Result<String> {
        let mut archive = Self::open(bytes)?;
        let mut file = archive.by_name(slide_path).map_err(Self::read_error)?;

        let mut xml = String::new();
        file.read_to_string(&mut xml).map_err(Self::read_error)?;

        Self::extract_text_from_xml(&xml)
            .map_err(|e| Self::read_error(format!("{slide_path}: {e}")))
    }

    /// Contents of every `a:t` node in document order, joined by spaces.
    fn extract_text_from_xml(xml: &str) -> std::result::Result<String, String> {
        let mut reader = Reader::from_str(xml);

        let mut text_parts = Vec::new();
        let mut current: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"a:t" {
                        current = Some(String::new());
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"a:t" {
                        text_parts.push(String::new());
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(part) = current.as_mut() {
                        part.push_str(&e.decode().map_err(|e| e.to_string())?);
                    }
                }
                Ok(Event::GeneralRef(e)) => {
                    if let Some(part) = current.as_mut() {
                        push_reference(part, &e)?;
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref() == b"a:t" {
                        if let Some(part) = current.take() {
                            text_parts.push(part);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.to_string()),
                _ => {}
            }
            buf.clear();
        }

        Ok(text_parts.join(" "))
    }
}
