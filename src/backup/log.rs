//! Append-only backup log
//!
//! A plain text file next to the snapshots. The first line names the tool,
//! every later line records one snapshot. The file is opened and closed for
//! each write so nothing holds it between cycles.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{ResolveBackupError, ResolveBackupResult};

pub const TOOL_NAME: &str = "Resolve Disk Database Backup Tool";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PUBLISHER: &str = "HDhead.com";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Header written once when the log is created
pub fn header_line() -> String {
    format!("{} V{}. {}", TOOL_NAME, TOOL_VERSION, PUBLISHER)
}

/// Handles writing to the backup log file
#[derive(Debug, Clone)]
pub struct BackupLog {
    path: PathBuf,
}

impl BackupLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log with its header line if it does not exist yet
    ///
    /// Returns `true` if the file was created. An existing log is left untouched.
    pub fn ensure_header(&self) -> ResolveBackupResult<bool> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(ResolveBackupError::DestinationSetup(format!(
                    "Failed to create log {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        write!(file, "{}{}", header_line(), LINE_ENDING).map_err(|e| {
            ResolveBackupError::DestinationSetup(format!("Failed to write log header: {}", e))
        })?;

        Ok(true)
    }

    /// Record a created snapshot
    pub fn record_created(&self, file_name: &str) -> ResolveBackupResult<()> {
        self.append(&format!("Created {}", file_name))
    }

    fn append(&self, line: &str) -> ResolveBackupResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ResolveBackupError::Io(format!("Failed to open backup log: {}", e)))?;

        write!(file, "{}{}", line, LINE_ENDING)
            .map_err(|e| ResolveBackupError::Io(format!("Failed to write backup log: {}", e)))?;

        file.flush()
            .map_err(|e| ResolveBackupError::Io(format!("Failed to flush backup log: {}", e)))?;

        Ok(())
    }

    /// Read all lines of the log, oldest first
    pub fn read_lines(&self) -> ResolveBackupResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| ResolveBackupError::Io(format!("Failed to open backup log: {}", e)))?;

        BufReader::new(file)
            .lines()
            .map(|line| {
                line.map(|l| l.trim_end_matches('\r').to_string())
                    .map_err(|e| ResolveBackupError::Io(format!("Failed to read backup log: {}", e)))
            })
            .collect()
    }
}
