//! Snapshot CLI commands
//!
//! Inspection and manual pruning of the destination directory.

use std::time::SystemTime;

use clap::Subcommand;

use crate::backup::catalog::list_snapshots;
use crate::backup::retention::{self, age_in_days};
use crate::config::SchedulerConfig;
use crate::error::ResolveBackupResult;

/// Snapshot subcommands
#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List snapshots in the destination directory
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Delete snapshots older than the retention window
    Prune {
        /// Delete without asking for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a snapshot command
pub fn handle_snapshot_command(config: &SchedulerConfig, cmd: SnapshotCommands) -> ResolveBackupResult<()> {
    let dest = config.paths.dest();

    match cmd {
        SnapshotCommands::List { verbose } => {
            let snapshots = list_snapshots(dest)?;

            if snapshots.is_empty() {
                println!("No snapshots found in {}.", dest.display());
                return Ok(());
            }

            println!("Available Snapshots");
            println!("===================");
            println!();

            let now = SystemTime::now();
            for (i, snapshot) in snapshots.iter().enumerate() {
                let age_days = age_in_days(now, snapshot.modified);
                let expired = retention::is_expired(age_days, config.max_days);
                let marker = if expired { " [expired]" } else { "" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        snapshot.file_name,
                        marker,
                        snapshot.created_at.format("%Y-%m-%d %H:%M:%S"),
                        format_size(snapshot.size_bytes),
                        format_age(age_days),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        snapshot.file_name,
                        format_age(age_days),
                        format_size(snapshot.size_bytes),
                        marker,
                    );
                }
            }

            println!();
            println!("Total: {} snapshot(s)", snapshots.len());
        }

        SnapshotCommands::Prune { force } => {
            let now = SystemTime::now();
            let candidates = retention::expired(dest, now, config.max_days)?;

            if candidates.is_empty() {
                println!("No snapshots to prune.");
                println!(
                    "Snapshots are kept while younger than {} days.",
                    config.max_days + 1
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            for path in &candidates {
                println!("  {}", path.display());
            }
            println!();

            if !force {
                println!("To delete {} snapshot(s), run again with --force:", candidates.len());
                println!("  resolve-backup snapshot prune --force");
                return Ok(());
            }

            let report = retention::sweep(dest, now, config.max_days)?;
            println!("Deleted {} snapshot(s).", report.deleted.len());
            for (path, e) in &report.failed {
                println!("Could not delete {}: {}", path.display(), e);
            }
        }
    }

    Ok(())
}

/// Format an age in days in human-readable form
fn format_age(days: f64) -> String {
    let total_seconds = (days * 86_400.0).max(0.0) as i64;

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
