//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the scheduler and backup layers.

pub mod run;
pub mod snapshot;

pub use run::handle_run;
pub use snapshot::{handle_snapshot_command, SnapshotCommands};
