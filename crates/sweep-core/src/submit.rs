//! Matrix submission
//!
//! [`Launcher::launch`] validates the axes, enumerates the matrix and submits
//! one job per point, in enumeration order. What happens after that depends
//! on the [`SubmissionMode`]:
//!
//! - `fire-and-forget`: return as soon as the last job is accepted
//! - `bounded-pool`: pass every handle, in submission order, to one
//!   [`TaskQueue::wait_for_pool`] call and await it
//!
//! Queue failures are not caught or retried here; the first one aborts the
//! launch and is returned as is.

use crate::axes::{AxisReport, Axes, Strictness};
use crate::error::{ConfigError, SweepError};
use crate::job::JobTemplate;
use crate::matrix::enumerate;
use crate::queue::{JobHandle, PoolSummary, TaskQueue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_POOL_WORKERS: usize = 8;

/// Mode name as written in config files and on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    #[default]
    FireAndForget,
    BoundedPool,
}

impl ModeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FireAndForget => "fire-and-forget",
            Self::BoundedPool => "bounded-pool",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fire-and-forget" => Ok(Self::FireAndForget),
            "bounded-pool" => Ok(Self::BoundedPool),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// How submitted jobs are followed up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionMode {
    /// Submit each job and return without waiting
    #[default]
    FireAndForget,
    /// Submit each job, then hand the batch to a pool of `workers`
    BoundedPool { workers: usize },
}

impl SubmissionMode {
    /// # Errors
    /// Returns `NoWorkers` for a pool of zero workers
    pub fn from_parts(kind: ModeKind, workers: usize) -> Result<Self, ConfigError> {
        match kind {
            ModeKind::FireAndForget => Ok(Self::FireAndForget),
            ModeKind::BoundedPool if workers == 0 => Err(ConfigError::NoWorkers),
            ModeKind::BoundedPool => Ok(Self::BoundedPool { workers }),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::FireAndForget => ModeKind::FireAndForget,
            Self::BoundedPool { .. } => ModeKind::BoundedPool,
        }
    }
}

impl fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FireAndForget => f.write_str("fire-and-forget"),
            Self::BoundedPool { workers } => write!(f, "bounded-pool ({workers} workers)"),
        }
    }
}

/// What a launch did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    pub mode: SubmissionMode,
    /// Handles in submission order
    pub submitted: Vec<JobHandle>,
    /// Present in pool mode
    pub pool: Option<PoolSummary>,
    pub axes: AxisReport,
}

/// Submits an experiment matrix to a task queue
pub struct Launcher {
    queue: Arc<dyn TaskQueue>,
    mode: SubmissionMode,
    strictness: Strictness,
}

impl Launcher {
    #[must_use]
    pub fn new(queue: Arc<dyn TaskQueue>, mode: SubmissionMode) -> Self {
        Self {
            queue,
            mode,
            strictness: Strictness::default(),
        }
    }

    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub fn mode(&self) -> SubmissionMode {
        self.mode
    }

    /// Submit one job per matrix point.
    ///
    /// # Errors
    /// - `Axes` if the axes fail validation (nothing is submitted)
    /// - `Config` for a pool mode with zero workers (nothing is submitted)
    /// - `Queue` with the first submission or pool failure
    pub async fn launch(
        &self,
        axes: &Axes,
        template: &JobTemplate,
    ) -> Result<LaunchReport, SweepError> {
        let axis_report = axes.validate(self.strictness)?;
        if let SubmissionMode::BoundedPool { workers: 0 } = self.mode {
            return Err(ConfigError::NoWorkers.into());
        }

        let matrix = enumerate(axes);
        tracing::info!(
            experiment = %template.experiment,
            jobs = matrix.len(),
            mode = %self.mode,
            "submitting experiment matrix"
        );

        let mut submitted = Vec::with_capacity(matrix.len());
        for point in &matrix {
            let job = template.instantiate(&point);
            let handle = self.queue.submit(job).await?;
            tracing::debug!(
                seq = handle.seq,
                id = %handle.id,
                output_dir = %handle.output_dir,
                "job submitted"
            );
            submitted.push(handle);
        }

        let pool = match self.mode {
            SubmissionMode::FireAndForget => None,
            SubmissionMode::BoundedPool { workers } => {
                tracing::info!(jobs = submitted.len(), workers, "waiting for pool");
                Some(self.queue.wait_for_pool(submitted.clone(), workers).await?)
            }
        };

        tracing::info!(jobs = submitted.len(), "launch complete");
        Ok(LaunchReport {
            mode: self.mode,
            submitted,
            pool,
            axes: axis_report,
        })
    }
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("mode", &self.mode)
            .field("strictness", &self.strictness)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::job::{JobDescriptor, RunArtifacts};
    use crate::queue::RecordingQueue;
    use mockall::predicate::*;
    use sweep_artifact::spec_experiment_artifacts;

    mockall::mock! {
        Queue {}

        #[async_trait::async_trait]
        impl TaskQueue for Queue {
            async fn submit(&self, job: JobDescriptor) -> Result<JobHandle, QueueError>;
            async fn wait_for_pool(
                &self,
                handles: Vec<JobHandle>,
                workers: usize,
            ) -> Result<PoolSummary, QueueError>;
        }
    }

    fn fixtures() -> (Axes, JobTemplate) {
        let (_, handles) = spec_experiment_artifacts().unwrap();
        let axes = Axes::new(
            ["kvm", "atomic"],
            [("kvm", vec!["test", "ref"]), ("atomic", vec!["test"])],
            ["401.bzip2", "429.mcf"],
        );
        (axes, JobTemplate::new("unit", RunArtifacts::from_catalog(&handles)))
    }

    #[test]
    fn mode_kind_parsing() {
        assert_eq!("bounded-pool".parse::<ModeKind>().unwrap(), ModeKind::BoundedPool);
        assert_eq!(
            "fire-and-forget".parse::<ModeKind>().unwrap(),
            ModeKind::FireAndForget
        );
        assert!(matches!(
            "round-robin".parse::<ModeKind>(),
            Err(ConfigError::UnknownMode(_))
        ));
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            SubmissionMode::from_parts(ModeKind::BoundedPool, 0),
            Err(ConfigError::NoWorkers)
        ));
        assert_eq!(
            SubmissionMode::from_parts(ModeKind::FireAndForget, 0).unwrap(),
            SubmissionMode::FireAndForget
        );
    }

    #[test]
    fn mode_kind_survives_from_parts() {
        for kind in [ModeKind::FireAndForget, ModeKind::BoundedPool] {
            assert_eq!(SubmissionMode::from_parts(kind, 4).unwrap().kind(), kind);
        }
        let launcher = Launcher::new(
            Arc::new(RecordingQueue::new()),
            SubmissionMode::BoundedPool { workers: 4 },
        );
        assert_eq!(launcher.mode().kind(), ModeKind::BoundedPool);
        assert_eq!(launcher.mode().to_string(), "bounded-pool (4 workers)");
    }

    #[tokio::test]
    async fn fire_and_forget_never_waits() {
        let (axes, template) = fixtures();
        let mut queue = MockQueue::new();
        let mut seq = 0;
        queue.expect_submit().times(6).returning(move |job| {
            let handle = JobHandle::issue(&job, seq);
            seq += 1;
            handle
        });
        queue.expect_wait_for_pool().never();

        let launcher = Launcher::new(Arc::new(queue), SubmissionMode::FireAndForget);
        let report = launcher.launch(&axes, &template).await.unwrap();
        assert_eq!(report.submitted.len(), 6);
        assert!(report.pool.is_none());
    }

    #[tokio::test]
    async fn pool_waits_once_with_workers() {
        let (axes, template) = fixtures();
        let mut queue = MockQueue::new();
        queue
            .expect_submit()
            .times(6)
            .returning(|job| JobHandle::issue(&job, 0));
        queue
            .expect_wait_for_pool()
            .with(always(), eq(3))
            .times(1)
            .returning(|handles, workers| {
                Ok(PoolSummary {
                    jobs: handles.len(),
                    workers,
                    pool_ref: None,
                })
            });

        let launcher = Launcher::new(Arc::new(queue), SubmissionMode::BoundedPool { workers: 3 });
        let report = launcher.launch(&axes, &template).await.unwrap();
        assert_eq!(report.pool.unwrap().jobs, 6);
    }

    #[tokio::test]
    async fn first_queue_error_aborts() {
        let (axes, template) = fixtures();
        let mut queue = MockQueue::new();
        let mut calls = 0;
        queue.expect_submit().times(3).returning(move |job| {
            calls += 1;
            if calls == 3 {
                Err(QueueError::Unavailable("broker down".into()))
            } else {
                JobHandle::issue(&job, calls)
            }
        });
        queue.expect_wait_for_pool().never();

        let launcher = Launcher::new(Arc::new(queue), SubmissionMode::BoundedPool { workers: 2 });
        let err = launcher.launch(&axes, &template).await.unwrap_err();
        assert!(matches!(err, SweepError::Queue(QueueError::Unavailable(_))));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn strict_mode_submits_nothing_on_mismatch() {
        let (mut axes, template) = fixtures();
        axes.cpus.push("o3".into());
        let queue = Arc::new(RecordingQueue::new());

        let launcher = Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
            .with_strictness(Strictness::Deny);
        let err = launcher.launch(&axes, &template).await.unwrap_err();
        assert!(matches!(err, SweepError::Axes(_)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn zero_worker_pool_submits_nothing() {
        let (axes, template) = fixtures();
        let queue = Arc::new(RecordingQueue::new());
        let launcher = Launcher::new(queue.clone(), SubmissionMode::BoundedPool { workers: 0 });
        let err = launcher.launch(&axes, &template).await.unwrap_err();
        assert!(matches!(err, SweepError::Config(ConfigError::NoWorkers)));
        assert!(queue.is_empty());
    }
}
