//! Filesystem hand-off to an external runner
//!
//! Layout under the spool root:
//!
//! ```text
//! jobs/000000-<hash>.json   one SpoolEntry per submitted job
//! pool-<ulid>.json          one PoolManifest per pool wait
//! ```
//!
//! The runner picks entries up in file-name order, which is submission order.

use super::{JobHandle, PoolSummary, TaskQueue};
use crate::error::QueueError;
use crate::job::JobDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use ulid::Ulid;

/// One spooled job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolEntry {
    pub handle: JobHandle,
    pub submitted_at: DateTime<Utc>,
    pub command: Vec<String>,
    pub job: JobDescriptor,
}

/// Batch of jobs to run on a bounded pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolManifest {
    pub pool_id: Ulid,
    pub workers: usize,
    pub created_at: DateTime<Utc>,
    pub handles: Vec<JobHandle>,
}

/// Queue that writes jobs into a spool directory
#[derive(Debug)]
pub struct SpoolQueue {
    root: PathBuf,
    next_seq: AtomicUsize,
}

impl SpoolQueue {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_seq: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), QueueError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| QueueError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn ensure_dir(path: &Path) -> Result<(), QueueError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| QueueError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait::async_trait]
impl TaskQueue for SpoolQueue {
    async fn submit(&self, job: JobDescriptor) -> Result<JobHandle, QueueError> {
        let dir = self.jobs_dir();
        Self::ensure_dir(&dir).await?;

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let handle = JobHandle::issue(&job, seq)?;
        let path = dir.join(format!("{seq:06}-{}.json", handle.job_hash.short()));

        let entry = SpoolEntry {
            handle: handle.clone(),
            submitted_at: Utc::now(),
            command: job.command(),
            job,
        };
        Self::write_json(&path, &entry).await?;

        tracing::trace!(path = %path.display(), "spooled job");
        Ok(handle)
    }

    async fn wait_for_pool(
        &self,
        handles: Vec<JobHandle>,
        workers: usize,
    ) -> Result<PoolSummary, QueueError> {
        Self::ensure_dir(&self.root).await?;

        let manifest = PoolManifest {
            pool_id: Ulid::new(),
            workers,
            created_at: Utc::now(),
            handles,
        };
        let path = self.root.join(format!("pool-{}.json", manifest.pool_id));
        Self::write_json(&path, &manifest).await?;

        Ok(PoolSummary {
            jobs: manifest.handles.len(),
            workers,
            pool_ref: Some(path.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobTemplate, RunArtifacts};
    use crate::matrix::MatrixPoint;
    use sweep_artifact::spec_experiment_artifacts;

    fn job(benchmark: &str) -> JobDescriptor {
        let (_, handles) = spec_experiment_artifacts().unwrap();
        JobTemplate::new("spool test", RunArtifacts::from_catalog(&handles)).instantiate(
            &MatrixPoint {
                cpu: "atomic",
                size: "test",
                benchmark,
            },
        )
    }

    #[tokio::test]
    async fn submit_writes_one_file_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SpoolQueue::new(dir.path());
        assert_eq!(queue.root(), dir.path());
        assert_eq!(queue.jobs_dir(), dir.path().join("jobs"));

        let first = queue.submit(job("505.mcf_r")).await.unwrap();
        let second = queue.submit(job("557.xz_r")).await.unwrap();
        assert_eq!((first.seq, second.seq), (0, 1));

        let mut names: Vec<String> = std::fs::read_dir(queue.jobs_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("000000-"));
        assert!(names[1].starts_with("000001-"));

        let raw = std::fs::read(queue.jobs_dir().join(&names[0])).unwrap();
        let entry: SpoolEntry = serde_json::from_slice(&raw).unwrap();
        assert_eq!(entry.handle, first);
        assert_eq!(entry.job.output_dir, "results/atomic/test/505.mcf_r");
        assert_eq!(entry.command[2], "--outdir=results/atomic/test/505.mcf_r");
    }

    #[tokio::test]
    async fn pool_manifest_keeps_handle_order() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SpoolQueue::new(dir.path());

        let handles = vec![
            queue.submit(job("505.mcf_r")).await.unwrap(),
            queue.submit(job("557.xz_r")).await.unwrap(),
        ];
        let summary = queue.wait_for_pool(handles.clone(), 4).await.unwrap();
        assert_eq!(summary.jobs, 2);

        let path = PathBuf::from(summary.pool_ref.unwrap());
        let manifest: PoolManifest =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(manifest.handles, handles);
        assert_eq!(manifest.workers, 4);
    }

    #[tokio::test]
    async fn unwritable_root_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let queue = SpoolQueue::new(&blocker);
        let err = queue.submit(job("505.mcf_r")).await.unwrap_err();
        assert!(matches!(err, QueueError::Io { ref path, .. } if path.starts_with(&blocker)));
    }
}
