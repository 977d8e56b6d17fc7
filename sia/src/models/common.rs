use serde::{Deserialize, Serialize};

/// Suffixes the dispatcher accepts, in the order they are listed to the user.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["docx", "pptx", "xlsx", "txt", "csv", "py", "json", "pdf"];

pub const ACCEPTED_EXTENSIONS_MESSAGE: &str =
    "Please select a valid file type. We accept: *.docx, *.pptx, *.xlsx, *.txt, *.csv, *.py, *.json, *.pdf";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Docx,
    Pptx,
    Xlsx,
    Text,
    Pdf,
}

impl FileKind {
    /// Classify a file name by its last suffix, ignoring case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "xlsx" => Some(Self::Xlsx),
            "txt" | "csv" | "py" | "json" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Docx => write!(f, "docx"),
            Self::Pptx => write!(f, "pptx"),
            Self::Xlsx => write!(f, "xlsx"),
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

/// Caller-selected category that picks which character limits apply.
///
/// Any string is accepted here; whether it is recognized is decided by the
/// limits configuration at validation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProjectType(String);

impl ProjectType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        Self::new("short")
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProjectType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl From<&str> for ProjectType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
