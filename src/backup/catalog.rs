//! Listing of existing snapshots in a destination directory

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use super::naming::parse_snapshot_time;
use crate::error::{ResolveBackupError, ResolveBackupResult};

/// Metadata about a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Snapshot filename
    pub file_name: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Creation time recovered from the filename
    pub created_at: DateTime<Local>,
    /// Filesystem modification time, which retention is based on
    pub modified: SystemTime,
    /// Size in bytes
    pub size_bytes: u64,
}

/// List all snapshots in `dest`, newest first
///
/// Files that do not follow the snapshot naming scheme are ignored.
pub fn list_snapshots(dest: &Path) -> ResolveBackupResult<Vec<SnapshotInfo>> {
    if !dest.exists() {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();

    for entry in fs::read_dir(dest)
        .map_err(|e| ResolveBackupError::Io(format!("Failed to read backup directory: {}", e)))?
    {
        let entry = entry
            .map_err(|e| ResolveBackupError::Io(format!("Failed to read directory entry: {}", e)))?;

        if let Some(info) = parse_snapshot_info(&entry.path()) {
            snapshots.push(info);
        }
    }

    // Sort by date, newest first
    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(snapshots)
}

fn parse_snapshot_info(path: &Path) -> Option<SnapshotInfo> {
    let file_name = path.file_name()?.to_string_lossy().to_string();
    let created_at = parse_snapshot_time(&file_name)?;

    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(SnapshotInfo {
        file_name,
        path: path.to_path_buf(),
        created_at,
        modified: metadata.modified().ok()?,
        size_bytes: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_snapshots_newest_first() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ResolveProjBackup_2024-01-02T03-04-05.zip"), "a").unwrap();
        fs::write(temp.path().join("ResolveProjBackup_2024-03-01T00-00-00.zip"), "bb").unwrap();
        fs::write(temp.path().join("ResolveBackup.log"), "header").unwrap();
        fs::write(temp.path().join("other.zip"), "c").unwrap();

        let snapshots = list_snapshots(temp.path()).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].file_name, "ResolveProjBackup_2024-03-01T00-00-00.zip");
        assert_eq!(snapshots[0].size_bytes, 2);
        assert_eq!(snapshots[1].file_name, "ResolveProjBackup_2024-01-02T03-04-05.zip");
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(list_snapshots(&temp.path().join("gone")).unwrap().is_empty());
    }
}
