//! Job descriptors
//!
//! A [`JobTemplate`] holds everything a simulation run needs apart from the
//! axis values. [`JobTemplate::instantiate`] combines it with one
//! [`MatrixPoint`] into a [`JobDescriptor`], the full parameter set handed to
//! the task queue.

use crate::error::SweepError;
use crate::matrix::{MatrixPoint, RESULTS_ROOT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sweep_artifact::{ArtifactGraph, ArtifactHandle, ContentHash, ExperimentArtifacts, HashError};

/// Five days
pub const DEFAULT_TIMEOUT_SECS: u64 = 5 * 24 * 60 * 60;

pub const DEFAULT_EXPERIMENT: &str = "gem5 19 spec 2006 experiment";
pub const DEFAULT_SIMULATOR_BINARY: &str = "gem5/build/X86/gem5.opt";
pub const DEFAULT_RUN_SCRIPT: &str = "gem5-configs/run_spec.py";
pub const DEFAULT_LINUX_BINARY: &str = "linux-4.19.83/vmlinux-4.19.83";
pub const DEFAULT_DISK_IMAGE: &str = "disk-image/spec2006/spec2006-image/spec2006";

/// Artifact references recorded with every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub simulator: ArtifactHandle,
    pub simulator_repo: ArtifactHandle,
    pub run_script_repo: ArtifactHandle,
    pub linux_binary: ArtifactHandle,
    pub disk_image: ArtifactHandle,
}

impl RunArtifacts {
    /// Pick the run references out of the stock catalog.
    ///
    /// Run scripts live in the experiments checkout, so it doubles as the
    /// run-script repository.
    #[must_use]
    pub fn from_catalog(artifacts: &ExperimentArtifacts) -> Self {
        Self {
            simulator: artifacts.gem5_binary.clone(),
            simulator_repo: artifacts.gem5_repo.clone(),
            run_script_repo: artifacts.experiments_repo.clone(),
            linux_binary: artifacts.linux_binary.clone(),
            disk_image: artifacts.disk_image.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactHandle> + '_ {
        [
            &self.simulator,
            &self.simulator_repo,
            &self.run_script_repo,
            &self.linux_binary,
            &self.disk_image,
        ]
        .into_iter()
    }
}

/// Parameters shared by every job of a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub experiment: String,
    pub simulator_binary: String,
    pub run_script: String,
    pub linux_binary: String,
    pub disk_image: String,
    pub results_root: String,
    pub timeout_secs: u64,
    pub artifacts: RunArtifacts,
}

impl JobTemplate {
    /// Template with the stock paths and a five day timeout
    #[must_use]
    pub fn new(experiment: impl Into<String>, artifacts: RunArtifacts) -> Self {
        Self {
            experiment: experiment.into(),
            simulator_binary: DEFAULT_SIMULATOR_BINARY.to_string(),
            run_script: DEFAULT_RUN_SCRIPT.to_string(),
            linux_binary: DEFAULT_LINUX_BINARY.to_string(),
            disk_image: DEFAULT_DISK_IMAGE.to_string(),
            results_root: RESULTS_ROOT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            artifacts,
        }
    }

    /// Timeout in whole seconds, rounded up; never less than one second
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = timeout.as_secs().saturating_add(partial).max(1);
        self
    }

    #[must_use]
    pub fn with_results_root(mut self, root: impl Into<String>) -> Self {
        self.results_root = root.into();
        self
    }

    /// Check that every referenced artifact belongs to `graph`.
    ///
    /// # Errors
    /// Returns `UnknownArtifact` with the first foreign handle.
    pub fn verify(&self, graph: &ArtifactGraph) -> Result<(), SweepError> {
        match self.artifacts.iter().find(|h| !graph.contains(h)) {
            Some(handle) => Err(SweepError::UnknownArtifact(handle.clone())),
            None => Ok(()),
        }
    }

    /// Build the descriptor for one matrix point
    #[must_use]
    pub fn instantiate(&self, point: &MatrixPoint<'_>) -> JobDescriptor {
        JobDescriptor {
            name: self.experiment.clone(),
            simulator_binary: self.simulator_binary.clone(),
            run_script: self.run_script.clone(),
            output_dir: point.output_dir_under(&self.results_root),
            artifacts: self.artifacts.clone(),
            linux_binary: self.linux_binary.clone(),
            disk_image: self.disk_image.clone(),
            cpu: point.cpu.to_string(),
            benchmark: point.benchmark.to_string(),
            size: point.size.to_string(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Everything needed to launch one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    pub simulator_binary: String,
    pub run_script: String,
    /// Relative output directory, `results/<cpu>/<size>/<benchmark>`
    pub output_dir: String,
    pub artifacts: RunArtifacts,
    pub linux_binary: String,
    pub disk_image: String,
    pub cpu: String,
    pub benchmark: String,
    pub size: String,
    pub timeout_secs: u64,
}

impl JobDescriptor {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Simulator command line the runner executes
    #[must_use]
    pub fn command(&self) -> Vec<String> {
        vec![
            self.simulator_binary.clone(),
            "-re".to_string(),
            format!("--outdir={}", self.output_dir),
            self.run_script.clone(),
            self.linux_binary.clone(),
            self.disk_image.clone(),
            self.cpu.clone(),
            self.benchmark.clone(),
            self.size.clone(),
        ]
    }

    /// Identity of the run
    ///
    /// # Errors
    /// Returns error if the descriptor cannot be serialized
    pub fn hash(&self) -> Result<ContentHash, HashError> {
        ContentHash::of_json(self)
    }
}
