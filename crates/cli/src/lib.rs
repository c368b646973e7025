//! Chainplan command-line entry points.
//!
//! The `conference-plan` and `travel-plan` binaries are thin wrappers around
//! [`launch`], which is the composition root for a run:
//!
//! 1. **Load configuration** from the environment ([`config::AppConfig`]).
//! 2. **Wire observability**: a `tracing-subscriber` registry with a stderr
//!    fmt layer and, when configured, an OpenTelemetry OTLP exporter
//!    ([`observability`]).
//! 3. **Construct infrastructure**: the [`llm::ChatCompletionsProvider`] is
//!    injected into a [`PipelineRunner`] together with the console progress
//!    observer.
//! 4. **Run and publish**: the plan's pipeline is executed, the rendered
//!    document is printed to stdout and saved with [`output::persist`].
//!
//! Any failure is printed with a remediation hint and turned into exit code 1.
//! A failed run writes no file.

pub mod config;
pub mod observability;
pub mod output;
pub mod progress;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use llm::ChatCompletionsProvider;
use pipeline::{report, PipelineError, PipelineRunner, RunResult};
use plans::Plan;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::progress::ConsoleProgress;

/// Runs `plan` end to end and returns the process exit code.
pub async fn launch<P: Plan>(plan: &P) -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("Set the variable in your environment or in a .env file.");
            return ExitCode::from(1);
        }
    };

    let otlp_endpoint = config.otlp_endpoint.as_deref();
    let telemetry = match observability::init(config.log_format, otlp_endpoint) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let code = match run(plan, &config).await {
        Ok(path) => {
            println!("\nPlan saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "plan failed");
            report_failure(&err);
            ExitCode::from(1)
        }
    };

    telemetry.shutdown();
    code
}

async fn run<P: Plan>(plan: &P, config: &AppConfig) -> anyhow::Result<PathBuf> {
    let provider_config = config
        .provider_config()
        .context("invalid provider configuration")?;
    let provider = ChatCompletionsProvider::new(provider_config)?;
    info!(
        provider = %config.provider,
        endpoint = provider.endpoint(),
        model = %config.settings.model,
        "provider configured"
    );

    let runner = PipelineRunner::new(Arc::new(provider), config.settings.clone())
        .with_observer(Arc::new(ConsoleProgress));

    run_with(plan, &runner, &config.output_dir).await
}

/// Runs `plan`, prints the document and saves it under `output_dir`.
///
/// Nothing is written unless every stage succeeded.
pub async fn run_with<P: Plan>(
    plan: &P,
    runner: &PipelineRunner,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let (result, document) = generate(plan, runner).await?;
    println!("{document}");

    output::persist(&document, output_dir, &plan.file_stem(), result.finished_at)
        .await
        .context("failed to save the plan")
}

/// Runs the plan's pipeline and renders the resulting document.
pub async fn generate<P: Plan>(
    plan: &P,
    runner: &PipelineRunner,
) -> anyhow::Result<(RunResult, String)> {
    let pipeline = plan.pipeline()?;
    let params = plan.parameters()?;
    let result = runner.run(&pipeline, &params).await?;
    let document = report::render(&result);
    Ok((result, document))
}

fn report_failure(err: &anyhow::Error) {
    let Some(failure) = err.downcast_ref::<PipelineError>() else {
        eprintln!("\nError: {err:#}");
        return;
    };

    eprintln!("\nError: {failure}");
    if let PipelineError::Generation { completed, .. } = failure {
        eprintln!("Stages completed before the failure: {}", completed.len());
    }
    eprintln!("Remediation: {}", failure.remediation());
}
