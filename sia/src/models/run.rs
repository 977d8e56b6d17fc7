use serde::Serialize;

use super::{FileKind, ProjectType};

/// Text pulled out of a file by exactly one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    /// Unicode scalar values in `text`, not bytes.
    pub character_count: usize,
}

impl ExtractionResult {
    pub fn new(text: String) -> Self {
        let character_count = text.chars().count();
        Self {
            text,
            character_count,
        }
    }

    /// Text as shown to the user. The count is still taken on the untrimmed text.
    pub fn display_text(&self) -> &str {
        self.text.trim()
    }
}

/// Terminal state of a run. Success and failure never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success { confirmation_code: String },
    Failure { reason: String },
}

/// Everything a presentation layer needs to render one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub file_name: Option<String>,
    pub kind: Option<FileKind>,
    pub project_type: ProjectType,
    pub text: String,
    pub character_count: usize,
    #[serde(flatten)]
    pub status: RunStatus,
}

impl RunReport {
    /// A report for a run that ended before any text was extracted.
    pub fn failure(
        file_name: Option<String>,
        project_type: ProjectType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file_name,
            kind: None,
            project_type,
            text: String::new(),
            character_count: 0,
            status: RunStatus::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Success { .. })
    }

    pub fn confirmation_code(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Success { confirmation_code } => Some(confirmation_code),
            RunStatus::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Failure { reason } => Some(reason),
            RunStatus::Success { .. } => None,
        }
    }
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Prior output must be cleared; a new run has started.
    Reset,
    Processing { pages: usize },
    PageCompleted { done: usize, total: usize },
    CharacterCount { count: usize },
    PageRenderFailed { page: usize, message: String },
    Failed { reason: String },
    Succeeded { confirmation_code: String },
}

impl std::fmt::Display for RunEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reset => write!(f, "Starting"),
            Self::Processing { pages } => {
                write!(f, "Processing {pages} page{}", if *pages == 1 { "" } else { "s" })
            }
            Self::PageCompleted { done, total } => write!(f, "Completed {done} of {total}"),
            Self::CharacterCount { count } => write!(f, "Characters so far: {count}"),
            Self::PageRenderFailed { page, message } => {
                write!(f, "Error rendering page {page}: {message}")
            }
            Self::Failed { reason } => write!(f, "{reason}"),
            Self::Succeeded { confirmation_code } => {
                write!(f, "Confirmation code: {confirmation_code}")
            }
        }
    }
}
