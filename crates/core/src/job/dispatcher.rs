//! Job submission entry point.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use super::registry::{JobError, JobRegistry};
use super::runner::JobRunner;
use super::types::{JobId, JobRecord};

/// Clamp a parsed file count to the valid range (>= 1).
pub fn clamp_file_count(n: i64) -> u32 {
    if n < 1 {
        1
    } else {
        n.min(u32::MAX as i64) as u32
    }
}

/// Normalize raw client input for the file count. Non-numeric input and
/// values below 1 silently coerce to 1; this is never a hard error.
pub fn normalize_file_count(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(clamp_file_count)
        .unwrap_or(1)
}

/// Validated parameters for one submission.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest {
    pub test_mode: bool,
    pub num_files: u32,
}

/// Allocates job ids, records submissions and spawns runners.
///
/// `submit` returns as soon as the record is registered and the runner task
/// is spawned; it never blocks on program execution.
pub struct JobDispatcher {
    registry: Arc<JobRegistry>,
    script_path: PathBuf,
}

impl JobDispatcher {
    pub fn new(registry: Arc<JobRegistry>, script_path: PathBuf) -> Self {
        Self {
            registry,
            script_path,
        }
    }

    /// Start a job in the background and return its id. The id resolves via
    /// the registry (status running) the instant this returns.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&self, request: FetchRequest) -> Result<JobId, JobError> {
        let id = JobId::new();
        let args = build_args(&request);
        let command = command_string(&self.script_path, &args);

        self.registry
            .insert(JobRecord::new(id.clone(), command.clone()))?;

        info!("Submitted job {}: {}", id, command);

        let runner = JobRunner::new(
            Arc::clone(&self.registry),
            id.clone(),
            self.script_path.clone(),
            args,
        );
        tokio::spawn(runner.run());

        Ok(id)
    }
}

/// Test mode adds `-t -n <count>`; the flags are only ever passed together.
fn build_args(request: &FetchRequest) -> Vec<String> {
    if request.test_mode {
        vec![
            "-t".to_string(),
            "-n".to_string(),
            request.num_files.to_string(),
        ]
    } else {
        Vec::new()
    }
}

fn command_string(script_path: &std::path::Path, args: &[String]) -> String {
    let mut command = script_path.display().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use std::path::Path;

    #[test]
    fn test_normalize_zero_coerces_to_one() {
        assert_eq!(normalize_file_count(Some("0")), 1);
    }

    #[test]
    fn test_normalize_negative_coerces_to_one() {
        assert_eq!(normalize_file_count(Some("-5")), 1);
    }

    #[test]
    fn test_normalize_non_numeric_coerces_to_one() {
        assert_eq!(normalize_file_count(Some("abc")), 1);
    }

    #[test]
    fn test_normalize_missing_defaults_to_one() {
        assert_eq!(normalize_file_count(None), 1);
    }

    #[test]
    fn test_normalize_valid_value_passes_through() {
        assert_eq!(normalize_file_count(Some("7")), 7);
        assert_eq!(normalize_file_count(Some(" 3 ")), 3);
    }

    #[test]
    fn test_clamp_file_count() {
        assert_eq!(clamp_file_count(-1), 1);
        assert_eq!(clamp_file_count(0), 1);
        assert_eq!(clamp_file_count(1), 1);
        assert_eq!(clamp_file_count(42), 42);
    }

    #[test]
    fn test_build_args_test_mode() {
        let args = build_args(&FetchRequest {
            test_mode: true,
            num_files: 3,
        });
        assert_eq!(args, vec!["-t", "-n", "3"]);
    }

    #[test]
    fn test_build_args_normal_mode_is_empty() {
        let args = build_args(&FetchRequest {
            test_mode: false,
            num_files: 3,
        });
        assert!(args.is_empty());
    }

    #[test]
    fn test_command_string() {
        let args = vec!["-t".to_string(), "-n".to_string(), "2".to_string()];
        assert_eq!(
            command_string(Path::new("/opt/fetch_logs.sh"), &args),
            "/opt/fetch_logs.sh -t -n 2"
        );
        assert_eq!(
            command_string(Path::new("/opt/fetch_logs.sh"), &[]),
            "/opt/fetch_logs.sh"
        );
    }

    #[tokio::test]
    async fn test_submit_returns_immediately_resolvable_id() {
        let registry = Arc::new(JobRegistry::new());
        // Program does not need to exist for submission to succeed; launch
        // failure surfaces later through the record.
        let dispatcher = JobDispatcher::new(
            Arc::clone(&registry),
            PathBuf::from("/nonexistent/fetch_logs.sh"),
        );

        let id = dispatcher
            .submit(FetchRequest {
                test_mode: true,
                num_files: 2,
            })
            .unwrap();

        let record = registry.get(&id).expect("record must exist at once");
        assert!(matches!(
            record.status,
            JobStatus::Running | JobStatus::Failed
        ));
        assert_eq!(record.command, "/nonexistent/fetch_logs.sh -t -n 2");
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_distinct_ids() {
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = JobDispatcher::new(
            Arc::clone(&registry),
            PathBuf::from("/nonexistent/fetch_logs.sh"),
        );

        let a = dispatcher
            .submit(FetchRequest {
                test_mode: false,
                num_files: 1,
            })
            .unwrap();
        let b = dispatcher
            .submit(FetchRequest {
                test_mode: false,
                num_files: 1,
            })
            .unwrap();

        assert_ne!(a, b);
        assert!(registry.get(&a).is_some());
        assert!(registry.get(&b).is_some());
    }
}
