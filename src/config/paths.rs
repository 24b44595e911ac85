//! Path management for resolve-backup
//!
//! Resolves the directory to archive and the directory receiving snapshots.
//!
//! ## Path Resolution Order
//!
//! 1. `RESOLVE_BACKUP_SOURCE` / `RESOLVE_BACKUP_DEST` environment variables (if set)
//! 2. Source: the DaVinci Resolve disk database `Resolve Projects` folder for the host OS
//! 3. Destination: `<Documents>/ResolveProjectBackup`

use std::path::{Path, PathBuf};

use directories::UserDirs;

use crate::error::ResolveBackupError;

/// Name of the log file kept next to the snapshots
pub const LOG_FILE_NAME: &str = "ResolveBackup.log";

/// Folder created under the user's Documents directory
const DEST_DIR_NAME: &str = "ResolveProjectBackup";

#[cfg(windows)]
const DEFAULT_SOURCE: &str = r"C:\ProgramData\Blackmagic Design\DaVinci Resolve\Support\Resolve Disk Database\Resolve Projects";

#[cfg(target_os = "macos")]
const DEFAULT_SOURCE: &str =
    "/Library/Application Support/Blackmagic Design/DaVinci Resolve/Resolve Disk Database/Resolve Projects";

#[cfg(not(any(windows, target_os = "macos")))]
const DEFAULT_SOURCE: &str = "/opt/resolve/Resolve Disk Database/Resolve Projects";

/// Source and destination directories of a backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPaths {
    /// Directory whose contents are archived
    source: PathBuf,
    /// Directory receiving snapshots and the log
    dest: PathBuf,
}

impl BackupPaths {
    /// Resolve source and destination for this host
    ///
    /// # Errors
    ///
    /// Returns an error if no destination override is set and the user's
    /// Documents directory cannot be determined.
    pub fn resolve() -> Result<Self, ResolveBackupError> {
        let source = match std::env::var_os("RESOLVE_BACKUP_SOURCE") {
            Some(custom) => PathBuf::from(custom),
            None => PathBuf::from(DEFAULT_SOURCE),
        };

        let dest = match std::env::var_os("RESOLVE_BACKUP_DEST") {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_dest()?,
        };

        Ok(Self { source, dest })
    }

    /// Create BackupPaths from explicit directories
    pub fn with_dirs(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Replace the source directory, keeping the destination
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Replace the destination directory, keeping the source
    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Get the path to the backup log
    pub fn log_file(&self) -> PathBuf {
        self.dest.join(LOG_FILE_NAME)
    }

    /// Get the archive path for a snapshot base name (`<dest>/<base>.zip`)
    pub fn snapshot_path(&self, base_name: &str) -> PathBuf {
        self.dest.join(format!("{}.zip", base_name))
    }

    /// Check that the source exists and is a directory
    pub fn validate_source(&self) -> Result<(), ResolveBackupError> {
        if self.source.is_dir() {
            Ok(())
        } else {
            Err(ResolveBackupError::Config(format!(
                "The Resolve disk database root is not found at {}",
                self.source.display()
            )))
        }
    }

    /// Ensure the destination directory exists, creating intermediate directories
    pub fn ensure_dest(&self) -> Result<(), ResolveBackupError> {
        std::fs::create_dir_all(&self.dest).map_err(|e| {
            ResolveBackupError::DestinationSetup(format!(
                "Failed to create destination directory {}: {}",
                self.dest.display(),
                e
            ))
        })
    }
}

/// Resolve `<Documents>/ResolveProjectBackup` for the current user
fn resolve_default_dest() -> Result<PathBuf, ResolveBackupError> {
    let dirs = UserDirs::new()
        .ok_or_else(|| ResolveBackupError::Config("Could not determine home directory".into()))?;

    let documents = dirs
        .document_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs.home_dir().join("Documents"));

    Ok(documents.join(DEST_DIR_NAME))
}
