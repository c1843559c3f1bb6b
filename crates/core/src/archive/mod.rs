//! Archive name validation, resolution and listing.
//!
//! The fetch script drops `.tar.gz` archives into a configured directory
//! using a fixed set of filename prefixes. Download requests by bare name
//! are reduced to their final path component and accepted only when they
//! match that naming contract, so a request can never escape the archive
//! directory.

mod types;

pub use types::*;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Required archive filename suffix.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Filename prefixes the fetch script is known to produce.
pub const RECOGNIZED_PREFIXES: [&str; 3] = [
    "harmonic_logs_",
    "harmonic_test_logs_",
    "harmonic_recent_logs_",
];

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid archive name: {0}")]
    InvalidName(String),

    #[error("Archive not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reduce a requested name to its final path component and check it against
/// the naming contract. Returns the bare filename on success.
pub fn sanitize_archive_name(requested: &str) -> Result<String, ArchiveError> {
    let name = Path::new(requested)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::InvalidName(requested.to_string()))?;

    let recognized = name.ends_with(ARCHIVE_SUFFIX)
        && RECOGNIZED_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix));
    if !recognized {
        return Err(ArchiveError::InvalidName(name.to_string()));
    }

    Ok(name.to_string())
}

/// Resolve a validated archive name against the archive directory.
pub fn resolve_archive(base_dir: &Path, requested: &str) -> Result<PathBuf, ArchiveError> {
    let name = sanitize_archive_name(requested)?;
    let path = base_dir.join(&name);
    if !path.is_file() {
        return Err(ArchiveError::NotFound(name));
    }
    Ok(path)
}

/// Enumerate recognized archives in the archive directory, newest first.
/// A missing directory yields an empty listing rather than an error.
pub fn list_archives(base_dir: &Path) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    if !base_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for dir_entry in std::fs::read_dir(base_dir)? {
        let dir_entry = dir_entry?;
        let filename = match dir_entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if sanitize_archive_name(&filename).is_err() {
            continue;
        }
        let metadata = dir_entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;

        entries.push(ArchiveEntry {
            date: friendly_date(&filename, modified),
            size: human_size(metadata.len()),
            size_bytes: metadata.len(),
            path: dir_entry.path(),
            filename,
            modified,
        });
    }

    entries.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(entries)
}

/// Derive a display date from the `*_logs_YYYY_MM_DD.tar.gz` pattern; test
/// archives are annotated. Falls back to the file's modification time.
fn friendly_date(filename: &str, modified: std::time::SystemTime) -> String {
    let date_regex = Regex::new(r"_logs_(\d{4})_(\d{2})_(\d{2})\.tar\.gz$").ok();
    if let Some(caps) = date_regex.and_then(|re| re.captures(filename)) {
        let (year, month, day) = (&caps[1], &caps[2], &caps[3]);
        return if filename.starts_with("harmonic_test_logs_") {
            format!("{year}-{month}-{day} (Test)")
        } else {
            format!("{year}-{month}-{day}")
        };
    }

    let mtime: DateTime<Utc> = modified.into();
    mtime.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::SystemTime;

    #[test]
    fn test_sanitize_accepts_recognized_names() {
        for name in [
            "harmonic_logs_2026_08_01.tar.gz",
            "harmonic_test_logs_2026_08_01.tar.gz",
            "harmonic_recent_logs_2026_08_01.tar.gz",
        ] {
            assert_eq!(sanitize_archive_name(name).unwrap(), name);
        }
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        let result = sanitize_archive_name("/var/logs/harmonic_logs_2026_08_01.tar.gz").unwrap();
        assert_eq!(result, "harmonic_logs_2026_08_01.tar.gz");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        // Reduces to "passwd", which fails the prefix/suffix check.
        let result = sanitize_archive_name("../../etc/passwd");
        assert!(matches!(result, Err(ArchiveError::InvalidName(_))));
    }

    #[test]
    fn test_sanitize_rejects_wrong_suffix() {
        let result = sanitize_archive_name("harmonic_logs_2026_08_01.zip");
        assert!(matches!(result, Err(ArchiveError::InvalidName(_))));
    }

    #[test]
    fn test_sanitize_rejects_unknown_prefix() {
        let result = sanitize_archive_name("random_logs_2026_08_01.tar.gz");
        assert!(matches!(result, Err(ArchiveError::InvalidName(_))));
    }

    #[test]
    fn test_sanitize_rejects_bare_parent_dir() {
        assert!(sanitize_archive_name("..").is_err());
    }

    #[test]
    fn test_resolve_archive_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_archive(dir.path(), "harmonic_logs_2026_08_01.tar.gz");
        assert!(matches!(result, Err(ArchiveError::NotFound(_))));
    }

    #[test]
    fn test_resolve_archive_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let name = "harmonic_logs_2026_08_01.tar.gz";
        fs::write(dir.path().join(name), b"data").unwrap();

        let path = resolve_archive(dir.path(), name).unwrap();
        assert_eq!(path, dir.path().join(name));
    }

    #[test]
    fn test_list_archives_missing_dir_is_empty() {
        let entries = list_archives(Path::new("/nonexistent/archive/dir")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_list_archives_filters_unrecognized_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("harmonic_logs_2026_08_01.tar.gz"),
            b"data",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), b"junk").unwrap();
        fs::write(dir.path().join("other.tar.gz"), b"junk").unwrap();

        let entries = list_archives(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "harmonic_logs_2026_08_01.tar.gz");
        assert_eq!(entries[0].date, "2026-08-01");
        assert_eq!(entries[0].size, "4 B");
    }

    #[test]
    fn test_friendly_date_test_archive_annotated() {
        let date = friendly_date(
            "harmonic_test_logs_2026_08_15.tar.gz",
            SystemTime::UNIX_EPOCH,
        );
        assert_eq!(date, "2026-08-15 (Test)");
    }

    #[test]
    fn test_friendly_date_falls_back_to_mtime() {
        let date = friendly_date("harmonic_logs_custom.tar.gz", SystemTime::UNIX_EPOCH);
        assert_eq!(date, "1970-01-01");
    }
}
