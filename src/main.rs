use anyhow::Context;
use std::process::ExitCode;
use texttape::domain::pipeline::{PipelineCoordinator, PipelineReport, PipelineServiceApi};
use texttape::domain::synthesis::Cancellation;
use texttape::domain::text::{clean_for_speech, CleaningOptions};
use texttape::error::AppError;
use texttape::infrastructure::config::{Config, LogFormat};
use texttape::infrastructure::storage::{read_document, write_audio, write_summary};
use texttape::infrastructure::synthesis::build_client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    // Initialize logging
    init_logging(&config);

    match run(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = format!("{:#}", e), "texttape failed");
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(config: Config) -> anyhow::Result<ExitCode> {
    let run_id = Uuid::new_v4();
    tracing::info!(
        run_id = %run_id,
        provider = ?config.provider,
        input = %config.input_text_file.display(),
        "Starting texttape"
    );

    // Load and clean the document
    let document = read_document(&config.input_text_file)
        .await
        .with_context(|| format!("reading {}", config.input_text_file.display()))?;
    let document = if config.clean_text {
        let cleaned = clean_for_speech(&document, CleaningOptions::default());
        tracing::info!(
            original_length = document.len(),
            cleaned_length = cleaned.len(),
            "Text cleaned"
        );
        cleaned
    } else {
        document
    };

    // Wire client and coordinator
    let client = build_client(&config).await?;
    let output_path = config.output_path(client.audio_format());
    let report_path = config.report_path(&output_path);
    let coordinator = PipelineCoordinator::new(client, config.pipeline_config());

    // Ctrl-C stops new synthesis requests; finished chunks are still written
    let (handle, cancellation) = Cancellation::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight chunks");
            handle.cancel();
        }
    });

    let report = match coordinator.run_with_id(run_id, &document, cancellation).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(report) = e.report() {
                write_summary(&report_path, &report.summary(run_id))
                    .await
                    .with_context(|| format!("writing {}", report_path.display()))?;
            }
            return Err(AppError::from(e).into());
        }
    };

    if let Some(output) = &report.output {
        write_audio(&output_path, &output.bytes)
            .await
            .with_context(|| format!("writing {}", output_path.display()))?;
    }
    write_summary(&report_path, &report.summary(run_id))
        .await
        .with_context(|| format!("writing {}", report_path.display()))?;

    log_outcome(&report);

    if report.cancelled {
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}

fn log_outcome(report: &PipelineReport) {
    if report.is_complete() {
        tracing::info!(total_chunks = report.total_chunks, "All chunks synthesized");
    } else {
        tracing::warn!(
            total_chunks = report.total_chunks,
            failed_indices = ?report.failed_indices(),
            skipped_indices = ?report.skipped_indices,
            "Some chunks are missing from the audio, see the run summary to retry them"
        );
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "texttape=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "texttape=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
