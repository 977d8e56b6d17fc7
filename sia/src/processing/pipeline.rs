use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, RemoteConfig};
use crate::confirmation::ConfirmationCodeGenerator;
use crate::error::Result;
use crate::models::{
    ExtractionResult, FileKind, ProjectType, RunEvent, RunReport, RunStatus, SelectedFile,
};
use crate::ocr::{OcrEngineFactory, OcrProvider};
use crate::remote::{self, ConfigSource};
use crate::render::{self, PageRenderer};
use crate::validation::{ValidationOutcome, Validator};

use super::dispatcher::{classify, Dispatcher};
use super::ProgressReporter;

/// One submission, start to finish: classify, extract, validate, then
/// issue a confirmation code.
///
/// Every call to [`run`](Self::run) is independent. Limits are fetched once
/// per run and nothing from a previous run is carried over.
pub struct SubmissionPipeline {
    source: Arc<dyn ConfigSource>,
    limits_resource: String,
    dispatcher: Dispatcher,
    confirmation: ConfirmationCodeGenerator,
}

impl SubmissionPipeline {
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = remote::from_config(&config.remote)?;
        let renderer = render::default_renderer(&config.render);
        let ocr = Arc::new(OcrProvider::new(&config.ocr));
        Ok(Self::new(source, renderer, ocr, &config.remote))
    }

    pub fn new(
        source: Arc<dyn ConfigSource>,
        renderer: Arc<dyn PageRenderer>,
        ocr: Arc<dyn OcrEngineFactory>,
        remote: &RemoteConfig,
    ) -> Self {
        let confirmation =
            ConfirmationCodeGenerator::new(Arc::clone(&source), remote.secret_resource.clone());
        Self {
            source,
            limits_resource: remote.limits_resource.clone(),
            dispatcher: Dispatcher::new(renderer, ocr),
            confirmation,
        }
    }

    pub async fn run(
        &self,
        file: Option<&SelectedFile>,
        project_type: &ProjectType,
        progress: &ProgressReporter,
    ) -> RunReport {
        progress.emit(RunEvent::Reset);

        let mut report = RunReport::failure(
            file.map(|f| f.name().to_string()),
            project_type.clone(),
            String::new(),
        );

        let (file, kind) = match classify(file) {
            Ok(classified) => classified,
            Err(e) => return Self::fail(report, e.to_string(), progress),
        };
        report.kind = Some(kind);

        info!(file = %file.name(), %kind, project_type = %project_type, "Starting run");

        let validator = Validator::load(self.source.as_ref(), &self.limits_resource).await;

        let extraction = match self
            .extract(kind, file, &validator, project_type, progress)
            .await
        {
            Ok(extraction) => extraction,
            Err(e) => return Self::fail(report, e.to_string(), progress),
        };
        report.text = extraction.display_text().to_string();
        report.character_count = extraction.character_count;

        if let ValidationOutcome::Rejected(reason) =
            validator.validate(extraction.character_count, project_type, true)
        {
            return Self::fail(report, reason, progress);
        }

        match self.confirmation.generate(file.bytes()).await {
            Ok(code) => {
                info!(
                    file = %file.name(),
                    character_count = report.character_count,
                    "Submission accepted"
                );
                progress.emit(RunEvent::Succeeded {
                    confirmation_code: code.as_str().to_string(),
                });
                report.status = RunStatus::Success {
                    confirmation_code: code.into_string(),
                };
                report
            }
            Err(e) => Self::fail(report, e.to_string(), progress),
        }
    }

    async fn extract(
        &self,
        kind: FileKind,
        file: &SelectedFile,
        validator: &Validator,
        project_type: &ProjectType,
        progress: &ProgressReporter,
    ) -> Result<ExtractionResult> {
        let extraction = self
            .dispatcher
            .extract(kind, file, validator, project_type, progress)
            .await?;
        progress.emit(RunEvent::CharacterCount {
            count: extraction.character_count,
        });
        Ok(extraction)
    }

    fn fail(mut report: RunReport, reason: String, progress: &ProgressReporter) -> RunReport {
        warn!(file = ?report.file_name, reason = %reason, "Submission rejected");
        progress.emit(RunEvent::Failed {
            reason: reason.clone(),
        });
        report.status = RunStatus::Failure { reason };
        report
    }
}
