#![allow(dead_code)]

// Common test utilities for integration tests
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use futures::StreamExt;
use zip::write::SimpleFileOptions;

use sia::config::RemoteConfig;
use sia::error::{Result, SiaError};
use sia::ocr::{OcrEngine, OcrEngineFactory};
use sia::processing::SubmissionPipeline;
use sia::remote::ConfigSource;
use sia::render::{PageImage, PageRenderer, RenderedPages};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const STANDARD_LIMITS: &str = r#"{
    "short": { "min": 0, "max": 15000 },
    "long": { "min": 18000, "max": 280000 }
}"#;

pub const SECRET: &str = "test-secret";

// ---------------------------------------------------------------------------
// Office document builders
// ---------------------------------------------------------------------------

fn zip_entries(entries: &[(&str, String)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, body) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A minimal DOCX whose body holds one paragraph per entry.
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape(p)
            )
        })
        .collect();

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    zip_entries(&[
        ("[Content_Types].xml", DOCX_CONTENT_TYPES.to_string()),
        ("_rels/.rels", DOCX_RELS.to_string()),
        ("word/document.xml", document),
    ])
}

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// A PPTX whose slides hold the given text runs, written to the archive in
/// slide order. A slide layout with its own text is added to check it is
/// not picked up.
pub fn build_pptx(slides: &[&[&str]]) -> Vec<u8> {
    let mut entries = vec![
        ("[Content_Types].xml".to_string(), PPTX_CONTENT_TYPES.to_string()),
        ("ppt/presentation.xml".to_string(), PPTX_PRESENTATION.to_string()),
        (
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            slide_xml(&["Layout placeholder"]),
        ),
    ];

    for (i, runs) in slides.iter().enumerate() {
        entries.push((format!("ppt/slides/slide{}.xml", i + 1), slide_xml(runs)));
    }

    let borrowed: Vec<(&str, String)> = entries
        .iter()
        .map(|(name, body)| (name.as_str(), body.clone()))
        .collect();
    zip_entries(&borrowed)
}

/// A PPTX with arbitrary slide entries, in the order given.
pub fn build_pptx_raw(slides: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<(&str, String)> = slides
        .iter()
        .map(|(name, body)| (*name, body.to_string()))
        .collect();
    zip_entries(&entries)
}

pub fn slide_xml(runs: &[&str]) -> String {
    let shapes: String = runs
        .iter()
        .map(|run| {
            format!(
                "<p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
                escape(run)
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}

const PPTX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
</Types>"#;

const PPTX_PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;

/// An XLSX with one worksheet per `(name, rows)` entry, in workbook order.
/// Numeric-looking values are written as numbers, the rest as inline strings.
pub fn build_xlsx(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    let sheet_list: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            )
        })
        .collect();

    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_list}</sheets></workbook>"#
    );

    let rels: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            )
        })
        .collect();

    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    );

    let overrides: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            )
        })
        .collect();

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}
</Types>"#
    );

    let mut entries = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), XLSX_RELS.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels),
    ];

    for (i, (_, rows)) in sheets.iter().enumerate() {
        entries.push((format!("xl/worksheets/sheet{}.xml", i + 1), worksheet_xml(rows)));
    }

    let borrowed: Vec<(&str, String)> = entries
        .iter()
        .map(|(name, body)| (name.as_str(), body.clone()))
        .collect();
    zip_entries(&borrowed)
}

fn column_name(index: usize) -> String {
    let mut name = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

fn worksheet_xml(rows: &[&[&str]]) -> String {
    let data: String = rows
        .iter()
        .enumerate()
        .map(|(r, cells)| {
            let cells: String = cells
                .iter()
                .enumerate()
                .map(|(c, value)| {
                    let reference = format!("{}{}", column_name(c), r + 1);
                    if value.parse::<f64>().is_ok() {
                        format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
                    } else {
                        format!(
                            r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                            escape(value)
                        )
                    }
                })
                .collect();
            format!(r#"<row r="{}">{cells}</row>"#, r + 1)
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

const XLSX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

// ---------------------------------------------------------------------------
// Configuration source
// ---------------------------------------------------------------------------

/// In-memory resources. Missing names fail like an unreachable endpoint.
#[derive(Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard limits plus [`SECRET`].
    pub fn standard() -> Self {
        Self::new()
            .with("limits.json", STANDARD_LIMITS)
            .with("secret.txt", SECRET)
    }

    pub fn with(mut self, resource: &str, body: &str) -> Self {
        self.resources.insert(resource.to_string(), body.to_string());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    async fn fetch_text(&self, resource: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| SiaError::ConfigFetch(format!("{resource}: 404 Not Found")))
    }
}

// ---------------------------------------------------------------------------
// Page renderer
// ---------------------------------------------------------------------------

/// Renders a fixed script of pages. Pages are produced only when pulled, and
/// `rendered` counts how many were pulled.
pub struct ScriptedRenderer {
    pages: Vec<std::result::Result<(), String>>,
    pub rendered: Arc<AtomicUsize>,
    pub opened: AtomicUsize,
}

impl ScriptedRenderer {
    pub fn pages(count: usize) -> Self {
        Self::script(vec![Ok(()); count])
    }

    /// `Err(message)` entries fail to render with that message.
    pub fn script(pages: Vec<std::result::Result<(), String>>) -> Self {
        Self {
            pages,
            rendered: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn open(&self, _pdf: Arc<[u8]>) -> Result<RenderedPages> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        let rendered = Arc::clone(&self.rendered);
        let script: Vec<_> = self.pages.iter().cloned().enumerate().collect();
        let pages = futures::stream::iter(script).map(move |(index, outcome)| {
            rendered.fetch_add(1, Ordering::SeqCst);
            let page_number = index + 1;
            match outcome {
                Ok(()) => Ok(PageImage {
                    page_number,
                    width: 1000,
                    height: 1414,
                    data: vec![0xFF, 0xD8, page_number as u8],
                }),
                Err(message) => Err(SiaError::Render {
                    page: page_number,
                    message,
                }),
            }
        });

        Ok(RenderedPages {
            page_count: self.pages.len(),
            pages: pages.boxed(),
        })
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct OcrCounters {
    pub created: AtomicUsize,
    pub recognized: AtomicUsize,
    pub terminated: AtomicUsize,
}

impl OcrCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn recognized(&self) -> usize {
        self.recognized.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Returns `page_text(page_number)` for every page, or fails on `fail_on`.
pub struct ScriptedOcr {
    page_text: fn(usize) -> String,
    fail_on: Option<usize>,
    pub counters: Arc<OcrCounters>,
}

impl ScriptedOcr {
    pub fn new(page_text: fn(usize) -> String) -> Self {
        Self {
            page_text,
            fail_on: None,
            counters: Arc::new(OcrCounters::default()),
        }
    }

    pub fn failing_on(mut self, page: usize) -> Self {
        self.fail_on = Some(page);
        self
    }
}

#[async_trait]
impl OcrEngineFactory for ScriptedOcr {
    async fn create_engine(&self) -> Result<Box<dyn OcrEngine>> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine {
            page_text: self.page_text,
            fail_on: self.fail_on,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct ScriptedEngine {
    page_text: fn(usize) -> String,
    fail_on: Option<usize>,
    counters: Arc<OcrCounters>,
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    async fn recognize(&mut self, page: &PageImage) -> Result<String> {
        self.counters.recognized.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(page.page_number) {
            return Err(SiaError::Ocr(format!("engine crashed on page {}", page.page_number)));
        }
        Ok((self.page_text)(page.page_number))
    }

    async fn terminate(self: Box<Self>) {
        self.counters.terminated.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Harness {
    pub pipeline: SubmissionPipeline,
    pub source: Arc<MemorySource>,
    pub renderer: Arc<ScriptedRenderer>,
    pub ocr: Arc<OcrCounters>,
}

pub fn harness(source: MemorySource, renderer: ScriptedRenderer, ocr: ScriptedOcr) -> Harness {
    init_test_logger();

    let source = Arc::new(source);
    let renderer = Arc::new(renderer);
    let counters = Arc::clone(&ocr.counters);

    let pipeline = SubmissionPipeline::new(
        source.clone(),
        renderer.clone(),
        Arc::new(ocr),
        &RemoteConfig::default(),
    );

    Harness {
        pipeline,
        source,
        renderer,
        ocr: counters,
    }
}

/// Pipeline with standard limits, no PDF pages and OCR that returns nothing.
pub fn standard_harness() -> Harness {
    harness(
        MemorySource::standard(),
        ScriptedRenderer::pages(0),
        ScriptedOcr::new(|_| String::new()),
    )
}
