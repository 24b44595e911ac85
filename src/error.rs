//! Custom error types for resolve-backup
//!
//! The variants follow the failure points of a backup run: configuration at
//! startup, destination setup, archiving and pruning.

use thiserror::Error;

/// The main error type for resolve-backup operations
#[derive(Error, Debug)]
pub enum ResolveBackupError {
    /// Source directory missing or not a directory, bad settings file
    #[error("Configuration error: {0}")]
    Config(String),

    /// The destination directory or log file could not be created
    #[error("Destination setup error: {0}")]
    DestinationSetup(String),

    /// Writing a snapshot archive failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// A retention candidate could not be inspected or deleted
    #[error("Prune error: {0}")]
    Prune(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl ResolveBackupError {
    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Errors that abort the process before the first cycle runs
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DestinationSetup(_))
    }
}

impl From<std::io::Error> for ResolveBackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ResolveBackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<walkdir::Error> for ResolveBackupError {
    fn from(err: walkdir::Error) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<zip::result::ZipError> for ResolveBackupError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for resolve-backup operations
pub type ResolveBackupResult<T> = Result<T, ResolveBackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveBackupError::Config("source missing".into());
        assert_eq!(err.to_string(), "Configuration error: source missing");
        assert!(err.is_config());
    }

    #[test]
    fn test_startup_fatality() {
        assert!(ResolveBackupError::Config("x".into()).is_fatal_at_startup());
        assert!(ResolveBackupError::DestinationSetup("x".into()).is_fatal_at_startup());
        assert!(!ResolveBackupError::Archive("x".into()).is_fatal_at_startup());
        assert!(!ResolveBackupError::Prune("x".into()).is_fatal_at_startup());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ResolveBackupError = io_err.into();
        assert!(matches!(err, ResolveBackupError::Io(_)));
    }
}
