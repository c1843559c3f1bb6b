//! In-memory job registry.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use thiserror::Error;

use super::types::{JobId, JobRecord, JobStatus};

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    #[error("Job {id} already finished as {status}")]
    Terminal { id: JobId, status: JobStatus },
}

/// Per-status record counts, used for dashboards and metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Process-wide mapping from job id to [`JobRecord`].
///
/// Owned by the application (no globals) and shared via `Arc`. A record has
/// a single writer (its runner task); any number of readers may observe it
/// mid-update and get a cloned snapshot. Records are kept for the lifetime
/// of the process; there is no persistence and no eviction.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a new record. Fails if the id is already present.
    pub fn insert(&self, record: JobRecord) -> Result<(), JobError> {
        let mut jobs = self.write();
        if jobs.contains_key(&record.id) {
            return Err(JobError::AlreadyExists(record.id.clone()));
        }
        jobs.insert(record.id.clone(), record);
        Ok(())
    }

    /// Append one output line to a running job.
    pub fn append_output(&self, id: &JobId, line: String) -> Result<(), JobError> {
        let mut jobs = self.write();
        let record = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.clone()))?;
        if record.status.is_terminal() {
            return Err(JobError::Terminal {
                id: id.clone(),
                status: record.status,
            });
        }
        record.output.push(line);
        Ok(())
    }

    /// Transition a running job to `Completed`, recording the archive path
    /// when the program reported one.
    pub fn mark_completed(
        &self,
        id: &JobId,
        archive_path: Option<String>,
    ) -> Result<(), JobError> {
        self.finish(id, JobStatus::Completed, archive_path)
    }

    /// Transition a running job to `Failed`.
    pub fn mark_failed(&self, id: &JobId) -> Result<(), JobError> {
        self.finish(id, JobStatus::Failed, None)
    }

    fn finish(
        &self,
        id: &JobId,
        status: JobStatus,
        archive_path: Option<String>,
    ) -> Result<(), JobError> {
        let mut jobs = self.write();
        let record = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.clone()))?;
        if record.status.is_terminal() {
            return Err(JobError::Terminal {
                id: id.clone(),
                status: record.status,
            });
        }
        record.status = status;
        record.archive_path = archive_path;
        Ok(())
    }

    /// Snapshot of a single record, or `None` for an unknown id.
    pub fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.read().get(id).cloned()
    }

    /// Up to `n` records, newest submission first.
    pub fn list_recent(&self, n: usize) -> Vec<JobRecord> {
        let jobs = self.read();
        let mut records: Vec<JobRecord> = jobs.values().cloned().collect();
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        records.truncate(n);
        records
    }

    /// Record counts per status.
    pub fn status_counts(&self) -> StatusCounts {
        let jobs = self.read();
        let mut counts = StatusCounts::default();
        for record in jobs.values() {
            match record.status {
                JobStatus::Running => counts.running += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
