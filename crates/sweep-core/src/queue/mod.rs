//! Task queue seam
//!
//! Running, retrying and timing out simulations belongs to an external task
//! system. This module only defines how jobs are handed over to it:
//! [`TaskQueue::submit`] for each job, and [`TaskQueue::wait_for_pool`] for
//! the pool variant that hands the whole batch to a bounded worker pool.

mod recording;
mod spool;

pub use recording::RecordingQueue;
pub use spool::{PoolManifest, SpoolEntry, SpoolQueue};

use crate::error::QueueError;
use crate::job::JobDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use sweep_artifact::ContentHash;
use ulid::Ulid;

/// Unique job identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub Ulid);

impl JobId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt for one submitted job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: JobId,
    /// Position in the queue's submission sequence
    pub seq: usize,
    pub job_hash: ContentHash,
    pub output_dir: String,
}

impl JobHandle {
    /// Issue a handle for `job` at position `seq`
    ///
    /// # Errors
    /// Returns error if the descriptor cannot be hashed
    pub fn issue(job: &JobDescriptor, seq: usize) -> Result<Self, QueueError> {
        let job_hash = job.hash().map_err(|e| QueueError::Rejected(e.to_string()))?;
        Ok(Self {
            id: JobId::new(),
            seq,
            job_hash,
            output_dir: job.output_dir.clone(),
        })
    }
}

/// Outcome of a pool wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    /// Number of handles passed to the wait call
    pub jobs: usize,
    pub workers: usize,
    /// Backend reference for the pool, if it has one
    pub pool_ref: Option<String>,
}

/// External asynchronous task interface
#[async_trait::async_trait]
pub trait TaskQueue: Send + Sync {
    /// Hand a job over for asynchronous execution. Returns once the queue has
    /// accepted it, not when it has run.
    async fn submit(&self, job: JobDescriptor) -> Result<JobHandle, QueueError>;

    /// Hand the batch to a pool of `workers`. Implementations may block until
    /// every job has completed; [`SpoolQueue`] returns once the pool manifest
    /// is written.
    async fn wait_for_pool(
        &self,
        handles: Vec<JobHandle>,
        workers: usize,
    ) -> Result<PoolSummary, QueueError>;
}

#[async_trait::async_trait]
impl<Q: TaskQueue + ?Sized> TaskQueue for Arc<Q> {
    async fn submit(&self, job: JobDescriptor) -> Result<JobHandle, QueueError> {
        (**self).submit(job).await
    }

    async fn wait_for_pool(
        &self,
        handles: Vec<JobHandle>,
        workers: usize,
    ) -> Result<PoolSummary, QueueError> {
        (**self).wait_for_pool(handles, workers).await
    }
}
