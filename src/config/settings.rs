//! Scheduler settings for resolve-backup
//!
//! Settings can come from an optional JSON file; CLI flags and environment
//! variables override individual fields. The merged result is frozen into a
//! [`SchedulerConfig`] once at startup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::BackupPaths;
use crate::error::ResolveBackupError;

/// Tunable values of the backup schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Minutes between backup cycles
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Delete snapshots older than this many days (plus one day of grace)
    #[serde(default = "default_max_days")]
    pub max_days: u64,
}

fn default_interval_minutes() -> u64 {
    120
}

fn default_max_days() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            max_days: default_max_days(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ResolveBackupError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ResolveBackupError::Config(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            ResolveBackupError::Config(format!("Failed to parse settings file: {}", e))
        })
    }

    /// Load settings from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ResolveBackupError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply optional overrides (from CLI flags or env vars)
    pub fn with_overrides(mut self, interval_minutes: Option<u64>, max_days: Option<u64>) -> Self {
        if let Some(interval) = interval_minutes {
            self.interval_minutes = interval;
        }
        if let Some(days) = max_days {
            self.max_days = days;
        }
        self
    }
}

/// Immutable configuration handed to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval_minutes: u64,
    pub max_days: u64,
    pub paths: BackupPaths,
}

impl SchedulerConfig {
    pub fn new(settings: Settings, paths: BackupPaths) -> Self {
        Self {
            interval_minutes: settings.interval_minutes,
            max_days: settings.max_days,
            paths,
        }
    }

    /// Idle time between the end of one cycle and the start of the next
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}
