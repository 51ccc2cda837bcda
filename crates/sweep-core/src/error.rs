//! Error types for sweep-core
//!
//! Provides error handling for:
//! - Inconsistent or malformed axis definitions
//! - Task queue submission failures
//! - Configuration loading and validation

use crate::axes::AxisIssue;
use std::path::PathBuf;
use sweep_artifact::{ArtifactError, ArtifactHandle};

/// Main sweep error type
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Axis definitions rejected
    #[error("axis error: {0}")]
    Axes(#[from] AxisError),

    /// Submission to the task queue failed
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Artifact registration failed
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// A job template refers to an artifact missing from the graph
    #[error("job template refers to unregistered artifact {0}")]
    UnknownArtifact(ArtifactHandle),
}

impl SweepError {
    /// Check if the failure might go away on a later attempt
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Queue(QueueError::Unavailable(_) | QueueError::Io { .. })
        )
    }
}

/// Axis definition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AxisError {
    /// CPU list or benchmark list is empty
    #[error("{0} axis is empty")]
    EmptyAxis(&'static str),

    /// A value appears twice on one axis
    #[error("duplicate {axis} value: {value}")]
    Duplicate { axis: &'static str, value: String },

    /// A value cannot be used as an output directory component
    #[error("invalid {axis} value: {value:?}")]
    InvalidValue { axis: &'static str, value: String },

    /// CPU list and size map disagree (strict mode only)
    #[error("inconsistent axes: {}", render_issues(.0))]
    Inconsistent(Vec<AxisIssue>),
}

fn render_issues(issues: &[AxisIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Task queue errors
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Queue backend cannot be reached
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    /// Queue refused the job
    #[error("job rejected: {0}")]
    Rejected(String),

    /// Filesystem hand-off failed
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Pool mode needs at least one worker
    #[error("bounded-pool mode needs at least one worker")]
    NoWorkers,

    /// Timeout must be positive
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// Results root is absolute, empty or leaves the working directory
    #[error("results root {0:?} must be a relative path below the working directory")]
    ResultsRoot(String),

    /// A required string setting is blank
    #[error("setting {0} must not be empty")]
    Blank(&'static str),

    /// Unknown submission mode name
    #[error("unknown submission mode {0:?} (expected fire-and-forget or bounded-pool)")]
    UnknownMode(String),
}
