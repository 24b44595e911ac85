//! resolve-backup - periodic snapshots of the DaVinci Resolve disk database
//!
//! Every interval the project database directory is compressed into a
//! timestamped zip archive, the event is appended to a log file, and archives
//! past the retention window are deleted.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Source/destination path resolution and schedule settings
//! - `error`: Custom error types
//! - `backup`: Snapshot naming, archiving, logging and retention
//! - `scheduler`: The backup cycle loop
//! - `report`: Fatal error presentation
//! - `cli`: Command handlers used by the `resolve-backup` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use resolve_backup::config::{BackupPaths, SchedulerConfig, Settings};
//! use resolve_backup::scheduler::{ticker, Scheduler};
//!
//! let config = SchedulerConfig::new(Settings::default(), BackupPaths::resolve()?);
//! let scheduler = Scheduler::with_system_clock(config);
//! scheduler.startup()?;
//!
//! let (ticker, _shutdown) = ticker();
//! scheduler.run(&ticker);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scheduler;

pub use error::{ResolveBackupError, ResolveBackupResult};
