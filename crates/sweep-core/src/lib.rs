//! Sweep Core - experiment matrix enumeration and job submission
//!
//! Turns axis definitions into one job per (CPU model, workload size,
//! benchmark) combination and hands each job to a task queue:
//! - [`axes`]: axis values and CPU/size consistency checks
//! - [`matrix`]: the lazy, restartable cross product
//! - [`job`]: job templates and descriptors
//! - [`queue`]: the external task queue seam and the bundled queues
//! - [`submit`]: fire-and-forget or bounded-pool submission
//! - [`config`]: TOML configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use sweep_core::prelude::*;
//! use std::sync::Arc;
//!
//! let (graph, artifacts) = sweep_artifact::spec_experiment_artifacts()?;
//! let config = SweepConfig::default();
//! let template = config.job_template(RunArtifacts::from_catalog(&artifacts));
//! template.verify(&graph)?;
//!
//! let launcher = Launcher::new(Arc::new(RecordingQueue::new()), config.submission_mode()?);
//! let report = launcher.launch(&config.axes, &template).await?;
//! println!("submitted {} jobs", report.submitted.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod axes;
pub mod config;
pub mod error;
pub mod job;
pub mod matrix;
pub mod queue;
pub mod submit;

pub use axes::{AxisIssue, AxisReport, Axes, Strictness, SPEC_BENCHMARKS};
pub use config::{PathsConfig, SubmissionConfig, SweepConfig};
pub use error::{AxisError, ConfigError, QueueError, SweepError};
pub use job::{JobDescriptor, JobTemplate, RunArtifacts};
pub use matrix::{enumerate, AxisPoint, Matrix, MatrixIter, MatrixPoint, RESULTS_ROOT};
pub use queue::{JobHandle, JobId, PoolSummary, RecordingQueue, SpoolQueue, TaskQueue};
pub use submit::{LaunchReport, Launcher, ModeKind, SubmissionMode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for launching sweeps
    pub use crate::{
        enumerate, Axes, JobDescriptor, JobTemplate, Launcher, RecordingQueue, RunArtifacts,
        SpoolQueue, Strictness, SubmissionMode, SweepConfig, SweepError, TaskQueue,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
