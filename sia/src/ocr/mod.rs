//! OCR (Optical Character Recognition) Module
//!
//! Recognizes text in rendered PDF pages. The engine itself is a black box
//! behind [`OcrEngine`]; [`OcrEngineFactory`] hands out one engine per PDF run.
//!
//! # Architecture
//!
//! - `OcrEngine` recognizes one image at a time and is terminated explicitly
//!   when the run ends, whether it finished, stopped early or failed
//! - `OcrProvider` implements the factory from `OcrConfig`:
//!   - "local/tesseract" creates a Tesseract instance via leptess
//!   - "openai/<model>" (or another OpenAI-compatible provider) calls a vision API
//!
//! # Usage
//!
//! ```rust,ignore
//! let provider = OcrProvider::new(&config.ocr);
//! let mut engine = provider.create_engine().await?;
//! let text = engine.recognize(&page).await;
//! engine.terminate().await;
//! ```

mod api;
mod provider;

pub use api::VisionOcrClient;
pub use provider::OcrProvider;

use async_trait::async_trait;

use crate::error::Result;
use crate::render::PageImage;

#[async_trait]
pub trait OcrEngine: Send {
    async fn recognize(&mut self, page: &PageImage) -> Result<String>;

    /// Release the engine's resources. Called once, after the last page.
    async fn terminate(self: Box<Self>);
}

#[async_trait]
pub trait OcrEngineFactory: Send + Sync {
    async fn create_engine(&self) -> Result<Box<dyn OcrEngine>>;
}
