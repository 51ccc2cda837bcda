//! Testing utilities for the sweep workspace
//!
//! Shared fixtures for axes, templates and queues.

#![allow(missing_docs)]

use std::sync::Arc;
use sweep_artifact::{spec_experiment_artifacts, ArtifactGraph};
use sweep_core::{Axes, JobTemplate, RecordingQueue, RunArtifacts};

/// Two CPUs, three sizes in total, two benchmarks: six jobs
pub fn small_axes() -> Axes {
    Axes::new(
        ["kvm", "atomic"],
        [("kvm", vec!["test", "ref"]), ("atomic", vec!["test"])],
        ["401.bzip2", "429.mcf"],
    )
}

/// Output directories of [`small_axes`], in enumeration order
pub fn small_axes_dirs() -> Vec<&'static str> {
    vec![
        "results/kvm/test/401.bzip2",
        "results/kvm/test/429.mcf",
        "results/kvm/ref/401.bzip2",
        "results/kvm/ref/429.mcf",
        "results/atomic/test/401.bzip2",
        "results/atomic/test/429.mcf",
    ]
}

/// Axes built from owned values, for generated inputs
pub fn axes_from(
    cpus: &[String],
    sizes: &[(String, Vec<String>)],
    benchmarks: &[String],
) -> Axes {
    Axes {
        cpus: cpus.to_vec(),
        benchmarks: benchmarks.to_vec(),
        sizes: sizes.iter().cloned().collect(),
    }
}

/// Stock artifact graph with a template that references it
pub fn stock_template(experiment: &str) -> (ArtifactGraph, JobTemplate) {
    let (graph, artifacts) = spec_experiment_artifacts().unwrap();
    let template = JobTemplate::new(experiment, RunArtifacts::from_catalog(&artifacts));
    (graph, template)
}

pub fn recording_queue() -> Arc<RecordingQueue> {
    Arc::new(RecordingQueue::new())
}
