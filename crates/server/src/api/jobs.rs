//! Job API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use logfetch_core::{
    clamp_file_count, normalize_file_count, FetchRequest, JobId, JobRecord, JobStatus,
    StatusCounts,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::metrics::JOBS_SUBMITTED_TOTAL;
use crate::state::AppState;

use super::archives::serve_attachment;

/// Maximum allowed limit for job listings
const MAX_LIMIT: usize = 100;

/// Default limit for job listings
const DEFAULT_LIMIT: usize = 10;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a job
#[derive(Debug, Default, Deserialize)]
pub struct SubmitJobBody {
    /// Run the fetch program in test mode
    #[serde(default)]
    pub test_mode: bool,
    /// Number of log files to fetch in test mode (accepts a number or a
    /// numeric string; anything else falls back to 1)
    pub num_files: Option<FileCount>,
}

/// File count as a JSON number or string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FileCount {
    Int(i64),
    Text(String),
}

impl FileCount {
    fn normalize(&self) -> u32 {
        match self {
            FileCount::Int(n) => clamp_file_count(*n),
            FileCount::Text(s) => normalize_file_count(Some(s.as_str())),
        }
    }
}

/// Query parameters for listing jobs
#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    /// Maximum number of jobs to return (most recent first)
    pub limit: Option<usize>,
}

/// Response for a submitted job
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Response for job status queries
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: JobId,
    pub status: JobStatus,
    /// Submission time rendered for display (`YYYY-MM-DD HH:MM:SS`, UTC)
    pub start_time: String,
    pub command: String,
    pub output: Vec<String>,
    pub archive_path: Option<String>,
    /// Final path component of `archive_path`, the name used for downloads
    pub archive_filename: Option<String>,
}

impl From<JobRecord> for JobResponse {
    fn from(record: JobRecord) -> Self {
        let archive_filename = record.archive_path.as_deref().and_then(|path| {
            std::path::Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        });
        Self {
            id: record.id,
            status: record.status,
            start_time: record.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            command: record.command,
            output: record.output,
            archive_path: record.archive_path,
            archive_filename,
        }
    }
}

/// Response for listing jobs
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobResponse>,
    pub counts: StatusCounts,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new log-fetch job.
///
/// The job starts in the background; the returned id is immediately
/// resolvable via `GET /jobs/{id}`.
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SubmitJobBody>>,
) -> Result<(StatusCode, Json<SubmitJobResponse>), impl IntoResponse> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let request = FetchRequest {
        test_mode: body.test_mode,
        num_files: body
            .num_files
            .as_ref()
            .map(FileCount::normalize)
            .unwrap_or(1),
    };

    match state.dispatcher().submit(request) {
        Ok(id) => {
            JOBS_SUBMITTED_TOTAL.inc();
            Ok((
                StatusCode::ACCEPTED,
                Json(SubmitJobResponse {
                    job_id: id,
                    status: JobStatus::Running,
                }),
            ))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JobErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// List recent jobs, most recently started first
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Json<ListJobsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let jobs = state
        .registry()
        .list_recent(limit)
        .into_iter()
        .map(JobResponse::from)
        .collect();

    Json(ListJobsResponse {
        jobs,
        counts: state.registry().status_counts(),
    })
}

/// Get a job by ID
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, impl IntoResponse> {
    match state.registry().get(&JobId::from(id)) {
        Some(record) => Ok(Json(JobResponse::from(record))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(JobErrorResponse {
                error: "Job not found".to_string(),
            }),
        )),
    }
}

/// Download the archive produced by a completed job.
///
/// Only the basename of the recorded archive path is used for the lookup,
/// and it must satisfy the archive naming rules.
pub async fn download_job_archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let record = match state.registry().get(&JobId::from(id)) {
        Some(record) => record,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(JobErrorResponse {
                    error: "Job not found".to_string(),
                }),
            )
                .into_response();
        }
    };

    if record.status != JobStatus::Completed {
        return (
            StatusCode::CONFLICT,
            Json(JobErrorResponse {
                error: format!("Job is {}, no archive available", record.status),
            }),
        )
            .into_response();
    }

    let archive_path = match record.archive_path {
        Some(path) => path,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(JobErrorResponse {
                    error: "Job completed without producing an archive".to_string(),
                }),
            )
                .into_response();
        }
    };

    serve_attachment(&state, &archive_path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_response_renders_display_time_and_filename() {
        let mut record = JobRecord::new(JobId::from("job-1"), "fetch_logs.sh".to_string());
        record.archive_path =
            Some("/var/data/archives/harmonic_logs_2026_08_27.tar.gz".to_string());

        let response = JobResponse::from(record.clone());

        assert_eq!(
            response.archive_filename.as_deref(),
            Some("harmonic_logs_2026_08_27.tar.gz")
        );
        assert_eq!(
            response.archive_path.as_deref(),
            Some("/var/data/archives/harmonic_logs_2026_08_27.tar.gz")
        );
        assert_eq!(
            response.start_time,
            record.start_time.format("%Y-%m-%d %H:%M:%S").to_string()
        );
        // Display format, not RFC3339
        assert!(!response.start_time.contains('T'));
        assert!(!response.start_time.contains('+'));
    }

    #[test]
    fn test_job_response_without_archive_has_no_filename() {
        let record = JobRecord::new(JobId::from("job-2"), "fetch_logs.sh".to_string());

        let response = JobResponse::from(record);

        assert!(response.archive_path.is_none());
        assert!(response.archive_filename.is_none());
    }

    #[test]
    fn test_file_count_normalization() {
        assert_eq!(FileCount::Int(5).normalize(), 5);
        assert_eq!(FileCount::Int(-2).normalize(), 1);
        assert_eq!(FileCount::Text("4".to_string()).normalize(), 4);
        assert_eq!(FileCount::Text("garbage".to_string()).normalize(), 1);
    }
}
