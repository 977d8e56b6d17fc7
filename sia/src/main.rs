use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sia::config::Config;
use sia::models::{ProjectType, RunEvent, RunReport, RunStatus, SelectedFile};
use sia::processing::{ProgressReporter, SubmissionPipeline};

#[derive(Parser)]
#[command(name = "sia")]
#[command(about = "Check a document submission against its character limits and issue a confirmation code")]
struct Args {
    /// Document to submit (.docx, .pptx, .xlsx, .pdf, .txt, .csv, .py, .json)
    file: Option<PathBuf>,

    /// Project type whose limits apply
    #[arg(short, long, default_value = "short")]
    project_type: ProjectType,

    /// Declared MIME type; guessed from the extension when omitted
    #[arg(long)]
    content_type: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Include the extracted text in the human-readable report
    #[arg(long)]
    show_text: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let pipeline = SubmissionPipeline::from_config(&config)?;

    let report = match &args.file {
        Some(path) => match SelectedFile::from_path(path, args.content_type.clone()).await {
            Ok(file) => run_with_progress(&pipeline, Some(&file), &args.project_type).await,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Unable to open file");
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                RunReport::failure(name, args.project_type.clone(), e.to_string())
            }
        },
        None => run_with_progress(&pipeline, None, &args.project_type).await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.show_text);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_with_progress(
    pipeline: &SubmissionPipeline,
    file: Option<&SelectedFile>,
    project_type: &ProjectType,
) -> RunReport {
    let (progress, mut events) = ProgressReporter::channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                // Terminal events are part of the final report.
                RunEvent::Reset | RunEvent::Failed { .. } | RunEvent::Succeeded { .. } => {}
                event => eprintln!("{event}"),
            }
        }
    });

    let report = pipeline.run(file, project_type, &progress).await;
    drop(progress);
    let _ = printer.await;

    report
}

fn print_report(report: &RunReport, show_text: bool) {
    if show_text && !report.text.is_empty() {
        println!("{}", report.text);
        println!();
    }

    if let Some(name) = &report.file_name {
        println!("File: {name}");
    }
    println!("Project type: {}", report.project_type);
    println!("Characters: {}", report.character_count);

    match &report.status {
        RunStatus::Success { confirmation_code } => {
            println!("Confirmation code: {confirmation_code}");
        }
        RunStatus::Failure { reason } => {
            println!("Rejected: {reason}");
        }
    }
}
