use thiserror::Error;

use crate::models::ACCEPTED_EXTENSIONS_MESSAGE;

/// User-facing message for any failure while computing the confirmation code.
pub const CRYPTO_ERROR_MESSAGE: &str =
    "Error generating confirmation code. Contact the Admins for help.";

#[derive(Error, Debug)]
pub enum SiaError {
    #[error("Unable to read file.")]
    MissingFile,

    #[error("{}", ACCEPTED_EXTENSIONS_MESSAGE)]
    UnsupportedFormat,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    Read(String),

    #[error("Configuration fetch failed: {0}")]
    ConfigFetch(String),

    #[error("{}", CRYPTO_ERROR_MESSAGE)]
    Crypto,

    #[error("Error rendering page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SiaError>;
