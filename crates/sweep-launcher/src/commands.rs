//! Subcommand implementations
//!
//! Each command writes its result to `out`; logs go through `tracing`.

use crate::cli::LaunchArgs;
use anyhow::Context;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use sweep_artifact::spec_experiment_artifacts;
use sweep_core::{
    enumerate, JobTemplate, LaunchReport, Launcher, RecordingQueue, RunArtifacts, SpoolQueue,
    SweepConfig, TaskQueue,
};

/// Config file if given, otherwise the stock experiment
///
/// # Errors
/// Returns error if the file cannot be loaded
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SweepConfig> {
    match path {
        Some(path) => SweepConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SweepConfig::default()),
    }
}

/// Register the build artifacts and derive the job template from `config`
///
/// # Errors
/// Returns error if registration fails or the template references a foreign artifact
pub fn prepare(config: &SweepConfig) -> anyhow::Result<JobTemplate> {
    let (graph, artifacts) =
        spec_experiment_artifacts().context("registering experiment artifacts")?;
    tracing::info!(artifacts = graph.len(), "artifact graph built");

    let template = config.job_template(RunArtifacts::from_catalog(&artifacts));
    template.verify(&graph)?;
    Ok(template)
}

/// `launch`: submit one job per matrix point
///
/// # Errors
/// Returns error if the config is invalid or submission fails
pub async fn launch(args: &LaunchArgs, out: &mut impl Write) -> anyhow::Result<LaunchReport> {
    let config = args.apply(load_config(args.config.as_deref())?);
    config.validate()?;
    let template = prepare(&config)?;

    let queue: Arc<dyn TaskQueue> = if args.dry_run {
        tracing::info!("dry run: jobs are recorded, not spooled");
        Arc::new(RecordingQueue::new())
    } else {
        let spool = SpoolQueue::new(&config.submission.spool_dir);
        tracing::info!(spool = %spool.root().display(), "spooling jobs");
        Arc::new(spool)
    };

    let launcher =
        Launcher::new(queue, config.submission_mode()?).with_strictness(config.strictness);
    tracing::info!(mode = %launcher.mode(), strictness = ?config.strictness, "launcher ready");
    let report = launcher
        .launch(&config.axes, &template)
        .await
        .with_context(|| format!("launching {}", config.experiment))?;

    writeln!(out, "Experiment: {}", config.experiment)?;
    writeln!(out, "Mode: {}", report.mode)?;
    writeln!(out, "Submitted: {}", report.submitted.len())?;
    for cpu in report.axes.skipped_cpus() {
        writeln!(out, "Skipped cpu: {cpu}")?;
    }
    if let Some(pool) = &report.pool {
        writeln!(out, "Pool: {} jobs on {} workers", pool.jobs, pool.workers)?;
        if let Some(pool_ref) = &pool.pool_ref {
            writeln!(out, "Pool manifest: {pool_ref}")?;
        }
    }
    Ok(report)
}

/// `plan`: print the matrix without submitting
///
/// # Errors
/// Returns error if the config or axes are invalid
pub fn plan(config_path: Option<&Path>, json: bool, out: &mut impl Write) -> anyhow::Result<usize> {
    let config = load_config(config_path)?;
    let template = prepare(&config)?;
    let report = config.axes.validate(config.strictness)?;
    let matrix = enumerate(&config.axes);

    if json {
        let jobs: Vec<_> = matrix
            .iter()
            .map(|point| {
                let job = template.instantiate(&point);
                json!({ "output_dir": job.output_dir, "command": job.command() })
            })
            .collect();
        let doc = json!({
            "experiment": config.experiment,
            "jobs": jobs,
            "issues": report.issues,
        });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
    } else {
        for point in &matrix {
            writeln!(out, "{}", template.instantiate(&point).output_dir)?;
        }
        writeln!(out, "{} jobs", matrix.len())?;
    }
    Ok(matrix.len())
}

/// `artifacts`: print the registered artifacts in build order
///
/// # Errors
/// Returns error if registration or output fails
pub fn artifacts(json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let (graph, _) = spec_experiment_artifacts().context("registering experiment artifacts")?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &graph.manifest())?;
        writeln!(out)?;
        return Ok(());
    }

    for descriptor in graph.build_order() {
        let inputs: Vec<String> = graph
            .inputs_of(&descriptor.handle())
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        writeln!(
            out,
            "{:<40} {:<14} {}",
            descriptor.handle().to_string(),
            descriptor.kind().to_string(),
            descriptor.path
        )?;
        if !inputs.is_empty() {
            writeln!(out, "    inputs: {}", inputs.join(", "))?;
        }
    }
    Ok(())
}
