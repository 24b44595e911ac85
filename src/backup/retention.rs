//! Age-based retention of snapshots
//!
//! Anything in the destination whose name ends in `zip` and whose modification
//! time is more than `max_days + 1` days before the sweep started is deleted.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{info, warn};

use super::naming::SNAPSHOT_EXTENSION;
use crate::error::{ResolveBackupError, ResolveBackupResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Outcome of one retention sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Files removed
    pub deleted: Vec<PathBuf>,
    /// Candidates that could not be inspected or removed
    pub failed: Vec<(PathBuf, ResolveBackupError)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Age of a file in (fractional) days; negative when `modified` is in the future
pub fn age_in_days(now: SystemTime, modified: SystemTime) -> f64 {
    match now.duration_since(modified) {
        Ok(age) => age.as_secs_f64() / SECONDS_PER_DAY,
        Err(ahead) => -ahead.duration().as_secs_f64() / SECONDS_PER_DAY,
    }
}

/// A snapshot expires once it is strictly older than `max_days + 1` days
pub fn is_expired(age_days: f64, max_days: u64) -> bool {
    age_days > (max_days + 1) as f64
}

/// Whether a directory entry name is a retention candidate
pub fn is_candidate(file_name: &str) -> bool {
    file_name.ends_with(SNAPSHOT_EXTENSION)
}

/// Delete expired archives directly inside `dest`
///
/// `now` is sampled once by the caller and used for every file. Failures on
/// individual files are logged and the sweep moves on to the next candidate.
pub fn sweep(dest: &Path, now: SystemTime, max_days: u64) -> ResolveBackupResult<SweepReport> {
    let mut report = SweepReport::default();

    for path in candidates(dest)? {
        let removed = is_file_expired(&path, now, max_days).and_then(|expired| {
            if expired {
                fs::remove_file(&path).map_err(|e| {
                    ResolveBackupError::Prune(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(expired)
        });

        match removed {
            Ok(true) => {
                info!(snapshot = %path.display(), "Deleted expired snapshot");
                report.deleted.push(path);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(snapshot = %path.display(), error = %e, "Could not prune snapshot");
                report.failed.push((path, e));
            }
        }
    }

    Ok(report)
}

/// List the archives a sweep at `now` would delete, without deleting them
pub fn expired(dest: &Path, now: SystemTime, max_days: u64) -> ResolveBackupResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for path in candidates(dest)? {
        match is_file_expired(&path, now, max_days) {
            Ok(true) => paths.push(path),
            Ok(false) => {}
            Err(e) => warn!(snapshot = %path.display(), error = %e, "Skipping snapshot"),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Entries directly inside `dest` whose name passes [`is_candidate`]
fn candidates(dest: &Path) -> ResolveBackupResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dest).map_err(|e| {
        ResolveBackupError::Prune(format!(
            "Failed to read destination {}: {}",
            dest.display(),
            e
        ))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) if is_candidate(&entry.file_name().to_string_lossy()) => {
                paths.push(entry.path())
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable directory entry"),
        }
    }
    Ok(paths)
}

/// Directories never expire, only regular files
fn is_file_expired(path: &Path, now: SystemTime, max_days: u64) -> ResolveBackupResult<bool> {
    let metadata = fs::metadata(path)
        .map_err(|e| ResolveBackupError::Prune(format!("Failed to stat {}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Ok(false);
    }

    let modified = metadata.modified().map_err(|e| {
        ResolveBackupError::Prune(format!("No modification time for {}: {}", path.display(), e))
    })?;

    Ok(is_expired(age_in_days(now, modified), max_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    const DAY: u64 = 86_400;

    /// Create a file with a fixed modification time and return that time
    fn file_with_mtime(dir: &Path, name: &str) -> SystemTime {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
            .unwrap();
        drop(file);
        fs::metadata(&path).unwrap().modified().unwrap()
    }

    #[test]
    fn test_is_expired_boundary() {
        assert!(!is_expired(30.0, 30));
        assert!(!is_expired(31.0, 30));
        assert!(is_expired(31.000_01, 30));
        assert!(!is_expired(-2.0, 0));
    }

    #[test]
    fn test_age_in_days() {
        let t = UNIX_EPOCH + Duration::from_secs(10 * DAY);
        assert_eq!(age_in_days(t + Duration::from_secs(DAY), t), 1.0);
        assert_eq!(age_in_days(t, t + Duration::from_secs(DAY / 2)), -0.5);
    }

    #[test]
    fn test_is_candidate_is_suffix_match() {
        assert!(is_candidate("ResolveProjBackup_2024-01-02T03-04-05.zip"));
        assert!(is_candidate("archivezip"));
        assert!(!is_candidate("old.ZIP"));
        assert!(!is_candidate("notes.txt"));
    }

    #[test]
    fn test_sweep_boundary_exactly_max_plus_one_kept() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "edge.zip");

        let now = mtime + Duration::from_secs(31 * DAY);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert!(report.deleted.is_empty());
        assert!(temp.path().join("edge.zip").exists());
    }

    #[test]
    fn test_sweep_just_past_boundary_deleted() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "old.zip");

        let now = mtime + Duration::from_secs(31 * DAY + 1);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert_eq!(report.deleted, vec![temp.path().join("old.zip")]);
        assert!(report.is_clean());
        assert!(!temp.path().join("old.zip").exists());
    }

    #[test]
    fn test_sweep_ignores_non_zip_files() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "notes.txt");
        file_with_mtime(temp.path(), "ResolveBackup.log");

        let now = mtime + Duration::from_secs(3650 * DAY);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert!(report.deleted.is_empty());
        assert!(temp.path().join("notes.txt").exists());
        assert!(temp.path().join("ResolveBackup.log").exists());
    }

    #[test]
    fn test_sweep_skips_directories_and_subfolders() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("folder.zip")).unwrap();
        let nested = temp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let mtime = file_with_mtime(&nested, "deep.zip");

        let now = mtime + Duration::from_secs(3650 * DAY);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert!(report.deleted.is_empty());
        assert!(temp.path().join("folder.zip").is_dir());
        assert!(nested.join("deep.zip").exists());
    }

    #[test]
    fn test_sweep_mixed_ages() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "old.zip");

        let fresh = temp.path().join("fresh.zip");
        let file = File::create(&fresh).unwrap();
        file.set_modified(mtime + Duration::from_secs(20 * DAY)).unwrap();
        drop(file);

        let now = mtime + Duration::from_secs(40 * DAY);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(!temp.path().join("old.zip").exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_expired_does_not_delete() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "old.zip");

        let now = mtime + Duration::from_secs(40 * DAY);
        let listed = expired(temp.path(), now, 30).unwrap();

        assert_eq!(listed, vec![temp.path().join("old.zip")]);
        assert!(temp.path().join("old.zip").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_sweep_continues_past_failed_candidate() {
        let temp = TempDir::new().unwrap();
        let mtime = file_with_mtime(temp.path(), "old.zip");
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("bad.zip"))
            .unwrap();

        let now = mtime + Duration::from_secs(40 * DAY);
        let report = sweep(temp.path(), now, 30).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, temp.path().join("bad.zip"));
        assert!(matches!(report.failed[0].1, ResolveBackupError::Prune(_)));
        assert_eq!(report.deleted, vec![temp.path().join("old.zip")]);
        assert!(!temp.path().join("old.zip").exists());
    }

    #[test]
    fn test_sweep_missing_dest_is_prune_error() {
        let temp = TempDir::new().unwrap();
        let err = sweep(&temp.path().join("gone"), SystemTime::now(), 30).unwrap_err();
        assert!(matches!(err, ResolveBackupError::Prune(_)));
    }
}
