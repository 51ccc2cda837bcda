//! In-memory queue used for dry runs

use super::{JobHandle, PoolSummary, TaskQueue};
use crate::error::QueueError;
use crate::job::JobDescriptor;
use parking_lot::Mutex;

/// Queue that accepts everything and remembers it
#[derive(Debug, Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<(JobHandle, JobDescriptor)>>,
    pools: Mutex<Vec<(Vec<JobHandle>, usize)>>,
}

impl RecordingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitted jobs in submission order
    #[must_use]
    pub fn jobs(&self) -> Vec<JobDescriptor> {
        self.jobs.lock().iter().map(|(_, job)| job.clone()).collect()
    }

    /// Handles issued so far, in submission order
    #[must_use]
    pub fn handles(&self) -> Vec<JobHandle> {
        self.jobs.lock().iter().map(|(h, _)| h.clone()).collect()
    }

    /// Every `wait_for_pool` call: the handles passed and the worker count
    #[must_use]
    pub fn pools(&self) -> Vec<(Vec<JobHandle>, usize)> {
        self.pools.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl TaskQueue for RecordingQueue {
    async fn submit(&self, job: JobDescriptor) -> Result<JobHandle, QueueError> {
        let mut jobs = self.jobs.lock();
        let handle = JobHandle::issue(&job, jobs.len())?;
        jobs.push((handle.clone(), job));
        Ok(handle)
    }

    async fn wait_for_pool(
        &self,
        handles: Vec<JobHandle>,
        workers: usize,
    ) -> Result<PoolSummary, QueueError> {
        let summary = PoolSummary {
            jobs: handles.len(),
            workers,
            pool_ref: None,
        };
        self.pools.lock().push((handles, workers));
        Ok(summary)
    }
}
