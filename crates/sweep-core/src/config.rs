//! Sweep configuration
//!
//! A TOML file describes one experiment: its axes, the paths passed to each
//! run, the timeout and how jobs are submitted. Every key is optional;
//! [`SweepConfig::default`] reproduces the stock SPEC experiment.
//!
//! ```toml
//! experiment = "gem5 19 spec 2006 experiment"
//! timeout_secs = 432000
//! strictness = "warn"
//!
//! [axes]
//! cpus = ["kvm", "atomic"]
//! benchmarks = ["401.bzip2", "429.mcf"]
//!
//! [axes.sizes]
//! kvm = ["test", "ref"]
//! atomic = ["test"]
//!
//! [submission]
//! mode = "bounded-pool"
//! workers = 8
//! spool_dir = "spool"
//! ```

use crate::axes::{Axes, Strictness};
use crate::error::ConfigError;
use crate::job::{
    JobTemplate, RunArtifacts, DEFAULT_DISK_IMAGE, DEFAULT_EXPERIMENT, DEFAULT_LINUX_BINARY,
    DEFAULT_RUN_SCRIPT, DEFAULT_SIMULATOR_BINARY, DEFAULT_TIMEOUT_SECS,
};
use crate::matrix::RESULTS_ROOT;
use crate::submit::{ModeKind, SubmissionMode, DEFAULT_POOL_WORKERS};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Paths handed to every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub simulator_binary: String,
    pub run_script: String,
    pub linux_binary: String,
    pub disk_image: String,
    pub results_root: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            simulator_binary: DEFAULT_SIMULATOR_BINARY.to_string(),
            run_script: DEFAULT_RUN_SCRIPT.to_string(),
            linux_binary: DEFAULT_LINUX_BINARY.to_string(),
            disk_image: DEFAULT_DISK_IMAGE.to_string(),
            results_root: RESULTS_ROOT.to_string(),
        }
    }
}

/// Submission settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub mode: ModeKind,
    /// Pool size; only used by `bounded-pool`
    pub workers: usize,
    /// Where the spool queue writes jobs
    pub spool_dir: PathBuf,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::default(),
            workers: DEFAULT_POOL_WORKERS,
            spool_dir: PathBuf::from("spool"),
        }
    }
}

/// Full launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub experiment: String,
    pub timeout_secs: u64,
    pub strictness: Strictness,
    pub axes: Axes,
    pub paths: PathsConfig,
    pub submission: SubmissionConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            experiment: DEFAULT_EXPERIMENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            strictness: Strictness::default(),
            axes: Axes::spec_defaults(),
            paths: PathsConfig::default(),
            submission: SubmissionConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Load and validate a config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), experiment = %config.experiment, "loaded config");
        Ok(config)
    }

    /// # Errors
    /// Returns error if the text is not a valid config
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns error if rendering fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Settings-level checks. Axis consistency is checked at launch.
    ///
    /// # Errors
    /// - `Blank` for an empty experiment name or path
    /// - `ResultsRoot` for an absolute results root or one containing `..`
    /// - `ZeroTimeout` for a zero timeout
    /// - `NoWorkers` for a pool without workers
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("experiment", &self.experiment),
            ("paths.simulator_binary", &self.paths.simulator_binary),
            ("paths.run_script", &self.paths.run_script),
            ("paths.linux_binary", &self.paths.linux_binary),
            ("paths.disk_image", &self.paths.disk_image),
            ("paths.results_root", &self.paths.results_root),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::Blank(*name));
        }
        check_results_root(&self.paths.results_root)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.submission_mode()?;
        Ok(())
    }

    /// # Errors
    /// Returns `NoWorkers` for a pool without workers
    pub fn submission_mode(&self) -> Result<SubmissionMode, ConfigError> {
        SubmissionMode::from_parts(self.submission.mode, self.submission.workers)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ModeKind) -> Self {
        self.submission.mode = mode;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.submission.workers = workers;
        self
    }

    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Job template for these settings
    #[must_use]
    pub fn job_template(&self, artifacts: RunArtifacts) -> JobTemplate {
        JobTemplate {
            experiment: self.experiment.clone(),
            simulator_binary: self.paths.simulator_binary.clone(),
            run_script: self.paths.run_script.clone(),
            linux_binary: self.paths.linux_binary.clone(),
            disk_image: self.paths.disk_image.clone(),
            results_root: self.paths.results_root.clone(),
            timeout_secs: self.timeout_secs,
            artifacts,
        }
    }
}

fn check_results_root(root: &str) -> Result<(), ConfigError> {
    let trimmed = root.trim_end_matches(['/', '\\']);
    let path = Path::new(trimmed);
    let escapes = trimmed.is_empty()
        || trimmed.starts_with(['/', '\\'])
        || path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(ConfigError::ResultsRoot(root.to_string()));
    }
    Ok(())
}
