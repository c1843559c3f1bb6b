//! Archive listing types.

use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// One downloadable archive in the configured archive directory.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub filename: String,
    pub path: PathBuf,
    /// Friendly date derived from the filename, falling back to mtime.
    pub date: String,
    /// Human-readable size ("512 B", "2.4 KB", "1.3 MB").
    pub size: String,
    pub size_bytes: u64,
    #[serde(skip)]
    pub modified: SystemTime,
}

/// Render a byte count the way the dashboard displays it.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
