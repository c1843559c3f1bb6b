//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique handle for a job, used for status and download lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Allocate a fresh id. UUIDs rule out the collision window that a
    /// second-resolution timestamp id would have for concurrent submissions.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Current status of a job.
///
/// Transitions only `Running -> Completed` or `Running -> Failed`;
/// terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true if no further transitions or output appends may occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation of the external log-fetch program and its tracked outcome.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    /// Unique identifier, assigned at submission time.
    pub id: JobId,

    /// Current status. `Running` from creation until the runner finishes.
    pub status: JobStatus,

    /// Submission timestamp; used for display and recency ordering.
    pub start_time: DateTime<Utc>,

    /// The literal invocation (program path + arguments), descriptive only.
    pub command: String,

    /// Captured program output, one trimmed line per entry, in emission
    /// order. Append-only; frozen once the job is terminal.
    pub output: Vec<String>,

    /// Archive location reported by the program, present only when the job
    /// completed and a marker line was found.
    pub archive_path: Option<String>,
}

impl JobRecord {
    /// Create a fresh record for a submission (status running, no output).
    pub fn new(id: JobId, command: String) -> Self {
        Self {
            id,
            status: JobStatus::Running,
            start_time: Utc::now(),
            command,
            output: Vec::new(),
            archive_path: None,
        }
    }
}
