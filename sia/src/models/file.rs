use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, SiaError};

use super::FileKind;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One user-selected file: raw bytes, the name used to infer its format and
/// the content type declared by whoever picked it.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The content type is guessed from the extension
    /// unless one is supplied.
    pub async fn from_path(path: &Path, content_type: Option<String>) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SiaError::Read(format!("Failed to read the file: {e}")))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(path)
                .first_raw()
                .unwrap_or_default()
                .to_string()
        });

        Ok(Self::new(name, content_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_file_name(&self.name)
    }

    /// Whether the declared type is PDF. Parameters such as `; charset=` are ignored.
    pub fn is_pdf(&self) -> bool {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE)
    }
}
