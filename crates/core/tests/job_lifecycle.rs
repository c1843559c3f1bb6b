//! Job lifecycle integration tests.
//!
//! These tests drive real submissions end to end: a temp shell script stands
//! in for the external log-fetch program, the dispatcher spawns a detached
//! runner and the tests poll the registry the way a status client would.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{sleep, Instant};

use logfetch_core::{FetchRequest, JobDispatcher, JobId, JobRegistry, JobStatus};

/// Test helper holding the registry, dispatcher and the scratch dir that
/// keeps the fake script alive.
struct TestHarness {
    registry: Arc<JobRegistry>,
    dispatcher: JobDispatcher,
    _temp_dir: TempDir,
}

impl TestHarness {
    /// Build a harness around a fake fetch script with the given body.
    fn with_script(body: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let script_path = temp_dir.path().join("fetch_logs.sh");
        write_script(&script_path, body);

        let registry = Arc::new(JobRegistry::new());
        let dispatcher = JobDispatcher::new(Arc::clone(&registry), script_path);

        Self {
            registry,
            dispatcher,
            _temp_dir: temp_dir,
        }
    }

    /// Harness pointed at a path with no program behind it.
    fn with_missing_script() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry = Arc::new(JobRegistry::new());
        let dispatcher = JobDispatcher::new(
            Arc::clone(&registry),
            PathBuf::from("/nonexistent/fetch_logs.sh"),
        );

        Self {
            registry,
            dispatcher,
            _temp_dir: temp_dir,
        }
    }

    fn submit(&self, test_mode: bool, num_files: u32) -> JobId {
        self.dispatcher
            .submit(FetchRequest {
                test_mode,
                num_files,
            })
            .expect("submission should succeed")
    }

    /// Poll until the job reaches a terminal status.
    async fn wait_for_terminal(&self, id: &JobId) -> logfetch_core::JobRecord {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let record = self.registry.get(id).expect("job should exist");
            if record.status.is_terminal() {
                return record;
            }
            assert!(
                Instant::now() < deadline,
                "job {id} did not finish in time"
            );
            sleep(Duration::from_millis(20)).await;
        }
    }
}

#[cfg(unix)]
fn write_script(path: &std::path::Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let content = format!("#!/bin/sh\n{body}\n");
    std::fs::write(path, content).expect("Failed to write script");
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let harness = TestHarness::with_script("exit 0");
    assert!(harness.registry.get(&JobId::new()).is_none());
}

#[tokio::test]
async fn test_submission_is_immediately_resolvable() {
    let harness = TestHarness::with_script("sleep 1\nexit 0");
    let id = harness.submit(false, 1);

    // The record exists with status running before the program finishes.
    let record = harness.registry.get(&id).expect("record must exist");
    assert_eq!(record.status, JobStatus::Running);
    assert!(record.output.is_empty());
}

#[tokio::test]
async fn test_successful_job_with_marker_records_archive_path() {
    let harness = TestHarness::with_script(
        "echo 'Fetching logs...'\n\
         echo 'Archive created:/tmp/out.tar.gz'\n\
         exit 0",
    );
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.archive_path.as_deref(), Some("/tmp/out.tar.gz"));
    assert_eq!(
        record.output,
        vec!["Fetching logs...", "Archive created:/tmp/out.tar.gz"]
    );
}

#[tokio::test]
async fn test_marker_path_whitespace_is_trimmed() {
    let harness = TestHarness::with_script("echo 'Archive created:   /tmp/out.tar.gz  '\nexit 0");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.archive_path.as_deref(), Some("/tmp/out.tar.gz"));
}

#[tokio::test]
async fn test_successful_job_without_marker_has_no_archive() {
    let harness = TestHarness::with_script("echo 'done, nothing archived'\nexit 0");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Completed);
    assert!(record.archive_path.is_none());
}

#[tokio::test]
async fn test_failing_job_is_marked_failed() {
    let harness = TestHarness::with_script("echo 'boom'\nexit 1");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.archive_path.is_none());
    assert_eq!(record.output, vec!["boom"]);
}

#[tokio::test]
async fn test_failing_job_ignores_marker_line() {
    let harness = TestHarness::with_script("echo 'Archive created:/tmp/out.tar.gz'\nexit 1");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.archive_path.is_none());
}

#[tokio::test]
async fn test_job_with_no_output_completes() {
    let harness = TestHarness::with_script("exit 0");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Completed);
    assert!(record.output.is_empty());
}

#[tokio::test]
async fn test_stderr_lines_are_captured() {
    let harness = TestHarness::with_script("echo 'warning: partial fetch' >&2\nexit 0");
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.output, vec!["warning: partial fetch"]);
}

#[tokio::test]
async fn test_output_preserves_emission_order() {
    let harness = TestHarness::with_script(
        "for i in 1 2 3 4 5; do echo \"line $i\"; done\nexit 0",
    );
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(
        record.output,
        vec!["line 1", "line 2", "line 3", "line 4", "line 5"]
    );
}

#[tokio::test]
async fn test_test_mode_flags_are_passed_to_program() {
    // The script echoes its arguments back; test mode must append -t -n <count>.
    let harness = TestHarness::with_script("echo \"args: $@\"\nexit 0");
    let id = harness.submit(true, 3);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.output, vec!["args: -t -n 3"]);
    assert!(record.command.ends_with("fetch_logs.sh -t -n 3"));
}

#[tokio::test]
async fn test_missing_program_fails_with_synthetic_error_line() {
    let harness = TestHarness::with_missing_script();
    let id = harness.submit(false, 1);

    let record = harness.wait_for_terminal(&id).await;
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.output.len(), 1);
    assert!(
        record.output[0].starts_with("Error: "),
        "expected synthetic error line, got {:?}",
        record.output
    );
}

#[tokio::test]
async fn test_terminal_record_is_immutable() {
    let harness = TestHarness::with_script("echo 'one'\nexit 0");
    let id = harness.submit(false, 1);

    let first = harness.wait_for_terminal(&id).await;
    // Give any stray writer a chance to misbehave, then re-read.
    sleep(Duration::from_millis(100)).await;
    let second = harness.registry.get(&id).unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.output, second.output);
    assert_eq!(first.archive_path, second.archive_path);
}

#[tokio::test]
async fn test_same_second_submissions_get_distinct_ids() {
    let harness = TestHarness::with_script("exit 0");

    let a = harness.submit(false, 1);
    let b = harness.submit(false, 1);

    assert_ne!(a, b);
    assert!(harness.registry.get(&a).is_some());
    assert!(harness.registry.get(&b).is_some());
}

#[tokio::test]
async fn test_concurrent_jobs_do_not_interleave_records() {
    let harness = TestHarness::with_script("echo \"count $@\"\nexit 0");

    let ids: Vec<JobId> = (1..=4).map(|n| harness.submit(true, n)).collect();

    for (i, id) in ids.iter().enumerate() {
        let record = harness.wait_for_terminal(id).await;
        let expected = format!("count -t -n {}", i + 1);
        assert_eq!(record.output, vec![expected]);
    }
}

#[tokio::test]
async fn test_recent_listing_is_bounded_and_ordered() {
    let harness = TestHarness::with_script("exit 0");

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(harness.submit(false, 1));
        // Spread start times so the ordering assertion is deterministic.
        sleep(Duration::from_millis(5)).await;
    }

    let recent = harness.registry.list_recent(3);
    assert_eq!(recent.len(), 3);
    assert!(recent[0].start_time >= recent[1].start_time);
    assert!(recent[1].start_time >= recent[2].start_time);
    assert_eq!(recent[0].id, ids[4]);
}
