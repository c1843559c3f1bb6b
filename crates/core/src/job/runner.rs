//! Background job runner.
//!
//! Owns the full lifecycle of one external-program invocation: spawn,
//! stream output into the registry and finalize the status. Runs detached
//! from the submitting request; every failure is absorbed into the record.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::registry::JobRegistry;
use super::types::JobId;

/// Marker substring the program emits on stdout to report the archive it
/// produced, e.g. `Archive created:/var/logs/harmonic_logs_2026_08_27.tar.gz`.
pub const ARCHIVE_MARKER: &str = "Archive created:";

/// Scan captured output for the marker line and extract the path after it.
/// Only the first matching line is honored; absence on success is valid
/// (the program produced no artifact).
pub fn find_archive_path(output: &[String]) -> Option<String> {
    output
        .iter()
        .find_map(|line| line.split_once(ARCHIVE_MARKER))
        .map(|(_, rest)| rest.trim().to_string())
}

pub(super) struct JobRunner {
    registry: Arc<JobRegistry>,
    id: JobId,
    program: PathBuf,
    args: Vec<String>,
}

impl JobRunner {
    pub(super) fn new(
        registry: Arc<JobRegistry>,
        id: JobId,
        program: PathBuf,
        args: Vec<String>,
    ) -> Self {
        Self {
            registry,
            id,
            program,
            args,
        }
    }

    /// Drive the invocation to a terminal status. Launch and read errors
    /// become a synthetic output line plus `Failed`; they are never raised
    /// to the submitter, who has already received the job id.
    pub(super) async fn run(self) {
        if let Err(e) = self.execute().await {
            self.append(format!("Error: {e}"));
            if let Err(e) = self.registry.mark_failed(&self.id) {
                warn!("Failed to mark job {} as failed: {}", self.id, e);
            }
        }
    }

    async fn execute(&self) -> std::io::Result<()> {
        debug!("Starting job {}: {:?} {:?}", self.id, self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();

        // Consume both streams line by line as they are produced. Lines keep
        // their order within each stream; interleaving between stdout and
        // stderr follows arrival and may differ from the program's emission
        // order across the two.
        let mut out_done = false;
        let mut err_done = false;
        while !(out_done && err_done) {
            tokio::select! {
                line = out_lines.next_line(), if !out_done => match line? {
                    Some(line) => self.append(line.trim().to_string()),
                    None => out_done = true,
                },
                line = err_lines.next_line(), if !err_done => match line? {
                    Some(line) => self.append(line.trim().to_string()),
                    None => err_done = true,
                },
            }
        }

        let status = child.wait().await?;

        if status.success() {
            let archive_path = self
                .registry
                .get(&self.id)
                .and_then(|record| find_archive_path(&record.output));
            debug!("Job {} completed, archive: {:?}", self.id, archive_path);
            if let Err(e) = self.registry.mark_completed(&self.id, archive_path) {
                warn!("Failed to mark job {} as completed: {}", self.id, e);
            }
        } else {
            debug!("Job {} failed with exit status {:?}", self.id, status.code());
            if let Err(e) = self.registry.mark_failed(&self.id) {
                warn!("Failed to mark job {} as failed: {}", self.id, e);
            }
        }

        Ok(())
    }

    fn append(&self, line: String) {
        if let Err(e) = self.registry.append_output(&self.id, line) {
            warn!("Dropping output line for job {}: {}", self.id, e);
        }
    }
}
