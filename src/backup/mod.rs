//! Snapshot creation and retention
//!
//! # Architecture
//!
//! - `naming`: timestamp tokens and snapshot file names
//! - `archive`: recursive zip of the source tree
//! - `log`: the append-only `ResolveBackup.log`
//! - `retention`: age predicate and the sweep that deletes expired archives
//! - `catalog`: listing of existing snapshots
//!
//! # Destination Layout
//!
//! The destination is flat: `ResolveBackup.log` plus zero or more
//! `ResolveProjBackup_<YYYY-MM-DDTHH-MM-SS>.zip` files.

pub mod archive;
pub mod catalog;
pub mod log;
pub mod naming;
pub mod retention;

pub use archive::{archive_directory, ArchiveStats};
pub use catalog::{list_snapshots, SnapshotInfo};
pub use log::BackupLog;
pub use naming::{sanitize_timestamp, snapshot_base_name, snapshot_file_name};
pub use retention::{is_expired, sweep, SweepReport};
