//! Configuration module for resolve-backup
//!
//! This module provides configuration management including:
//! - OS-specific source and destination path resolution
//! - Schedule settings (interval and retention window)

pub mod paths;
pub mod settings;

pub use paths::BackupPaths;
pub use settings::{SchedulerConfig, Settings};
