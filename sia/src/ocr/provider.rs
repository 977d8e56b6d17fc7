use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{parse_provider_model, OcrConfig};
use crate::error::{Result, SiaError};
use crate::render::PageImage;

use super::api::VisionOcrClient;
use super::{OcrEngine, OcrEngineFactory};

enum OcrBackend {
    Local { languages: String },
    Api { client: VisionOcrClient },
    Unavailable { reason: String },
}

pub struct OcrProvider {
    backend: OcrBackend,
    timeout: Duration,
}

fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        let (provider, _) = parse_provider_model(&config.model);

        let backend = if provider.eq_ignore_ascii_case("local") {
            info!(languages = %config.languages, "Using local Tesseract OCR");
            OcrBackend::Local {
                languages: config.languages.clone(),
            }
        } else {
            match VisionOcrClient::new(config) {
                Ok(client) => {
                    info!(model = %config.model, "Vision OCR API backend initialized");
                    OcrBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("{} backend unavailable: {e}", config.model);
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            }
        };

        Self {
            backend,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }
}

#[async_trait]
impl OcrEngineFactory for OcrProvider {
    async fn create_engine(&self) -> Result<Box<dyn OcrEngine>> {
        match &self.backend {
            OcrBackend::Local { languages } => {
                let languages = languages.clone();
                let tesseract = tokio::task::spawn_blocking(move || create_tesseract(&languages))
                    .await
                    .map_err(|e| SiaError::Ocr(format!("OCR task panicked: {e}")))?
                    .map_err(|e| SiaError::OcrUnavailable(format!("Tesseract not available: {e}")))?;

                debug!("Tesseract engine created");
                Ok(Box::new(TesseractEngine {
                    tesseract: Arc::new(Mutex::new(tesseract)),
                    timeout: self.timeout,
                }))
            }
            OcrBackend::Api { client } => Ok(Box::new(VisionEngine {
                client: client.clone(),
                timeout: self.timeout,
            })),
            OcrBackend::Unavailable { reason } => Err(SiaError::OcrUnavailable(reason.clone())),
        }
    }
}

async fn with_timeout<F>(timeout: Duration, future: F) -> Result<String>
where
    F: std::future::Future<Output = Result<String>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(inner_result) => inner_result,
        Err(_) => Err(SiaError::Ocr(format!(
            "OCR operation timed out after {} seconds",
            timeout.as_secs()
        ))),
    }
}

struct TesseractEngine {
    tesseract: Arc<Mutex<LepTess>>,
    timeout: Duration,
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&mut self, page: &PageImage) -> Result<String> {
        let bytes = page.data.clone();
        let tesseract = Arc::clone(&self.tesseract);

        let task = async move {
            tokio::task::spawn_blocking(move || {
                let mut lt = tesseract.blocking_lock();
                lt.set_image_from_mem(&bytes)
                    .map_err(|e| SiaError::Ocr(format!("Failed to set image: {e}")))?;
                lt.get_utf8_text()
                    .map_err(|e| SiaError::Ocr(format!("Failed to extract text: {e}")))
            })
            .await
            .map_err(|e| SiaError::Ocr(format!("OCR task panicked: {e}")))?
        };

        with_timeout(self.timeout, task).await
    }

    async fn terminate(self: Box<Self>) {
        let tesseract = self.tesseract;
        // Tesseract teardown is blocking native code.
        let _ = tokio::task::spawn_blocking(move || drop(tesseract)).await;
        debug!("Tesseract engine terminated");
    }
}

struct VisionEngine {
    client: VisionOcrClient,
    timeout: Duration,
}

#[async_trait]
impl OcrEngine for VisionEngine {
    async fn recognize(&mut self, page: &PageImage) -> Result<String> {
        with_timeout(self.timeout, self.client.ocr(&page.data)).await
    }

    async fn terminate(self: Box<Self>) {
        debug!("Vision OCR engine released");
    }
}
