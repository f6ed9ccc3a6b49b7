//! MRO CLI - command surface
//!
//! A run takes a models directory and two output directories, reviews
//! every paired model, and optionally optimizes afterwards. Exit behavior
//! is process-level success/failure of the whole async run.
//!
//! The batch pipeline requires a configured credential: unlike the
//! conversational path, batch runs have no offline fallback, so a missing
//! key fails fast instead of producing demo content.

use anyhow::Context as _;
use clap::Parser;
use mro_engine::{BatchScheduler, RunContext};
use mro_llm::{GenerationBackend, OpenAiBackend, OpenAiConfig};
use mro_registry::Registry;
use mro_report::{ReportGenerator, ReportObserver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the generation credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Arguments for one review/optimize run
#[derive(Parser, Debug)]
#[command(
    name = "mro",
    version,
    about = "Review and optimize SQL transformation models"
)]
pub struct RunArgs {
    /// Directory containing model definitions and schema documents
    #[arg(long)]
    pub models_dir: PathBuf,

    /// Directory for review results
    #[arg(long, default_value = "review_results")]
    pub review_dir: PathBuf,

    /// Directory for optimized models
    #[arg(long, default_value = "optimized_models")]
    pub optimization_dir: PathBuf,

    /// Run optimization after review
    #[arg(long, default_value_t = false)]
    pub optimize: bool,

    /// Chat-completions endpoint override
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model identifier override
    #[arg(long)]
    pub model: Option<String>,
}

/// Run with a backend built from the environment credential
///
/// # Errors
/// Fails when no credential is configured, and on any discovery, batch,
/// or report failure.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let backend = backend_from_env(&args)?;
    run_with_backend(args, backend).await
}

/// Run the full pipeline with an injected backend
///
/// # Errors
/// Discovery, batch, and report failures abort the run; output flushed by
/// earlier completed batches stays on disk.
pub async fn run_with_backend(
    args: RunArgs,
    backend: Arc<dyn GenerationBackend>,
) -> anyhow::Result<()> {
    let set = Registry::new(&args.models_dir)
        .discover()
        .context("model discovery failed")?;
    for artifact in set.missing_metadata() {
        tracing::warn!(artifact = artifact.name(), "no documentation found; skipping review");
    }

    let mut ctx = RunContext::new(set);
    let generator = ReportGenerator::new(&args.review_dir, &args.optimization_dir);
    let mut observer = ReportObserver::new(generator.clone());
    let scheduler = BatchScheduler::new(backend);

    scheduler
        .review_all(&mut ctx, &mut observer)
        .await
        .context("review run failed")?;

    if args.optimize {
        tracing::info!("starting optimization pass");
        scheduler
            .optimize_all(&mut ctx, &mut observer)
            .await
            .context("optimization run failed")?;
    }

    generator.write_run(&ctx).context("report generation failed")?;
    Ok(())
}

fn backend_from_env(args: &RunArgs) -> anyhow::Result<Arc<dyn GenerationBackend>> {
    let api_key = std::env::var(API_KEY_ENV).with_context(|| {
        format!("{API_KEY_ENV} must be set; batch runs have no offline fallback")
    })?;

    let mut config = OpenAiConfig::new(api_key);
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }

    Ok(Arc::new(OpenAiBackend::new(config)))
}

/// Install the stderr tracing subscriber, `RUST_LOG`-filterable
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
