use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resolve_backup::cli::{handle_run, handle_snapshot_command, SnapshotCommands};
use resolve_backup::config::{BackupPaths, SchedulerConfig, Settings};
use resolve_backup::report::{report_fatal, ConsoleReporter};

#[derive(Parser)]
#[command(
    name = "resolve-backup",
    version,
    about = "Periodic zip snapshots of the DaVinci Resolve disk database",
    long_about = "resolve-backup archives the Resolve Projects folder of a DaVinci \
                  Resolve disk database into timestamped zip files at a fixed \
                  interval and deletes snapshots older than the retention window."
)]
struct Cli {
    /// Directory to archive (defaults to the Resolve disk database)
    #[arg(long, global = true, env = "RESOLVE_BACKUP_SOURCE")]
    source: Option<PathBuf>,

    /// Directory receiving snapshots and the log
    #[arg(long, global = true, env = "RESOLVE_BACKUP_DEST")]
    dest: Option<PathBuf>,

    /// Minutes between backup cycles
    #[arg(long, global = true, env = "RESOLVE_BACKUP_INTERVAL")]
    interval: Option<u64>,

    /// Delete snapshots older than this many days
    #[arg(long, global = true, env = "RESOLVE_BACKUP_MAX_DAYS")]
    max_days: Option<u64>,

    /// JSON settings file with `interval_minutes` and `max_days`
    #[arg(long, global = true, env = "RESOLVE_BACKUP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backup loop (default)
    Run {
        /// Take a single snapshot and exit
        #[arg(long)]
        once: bool,
    },

    /// Snapshot inspection commands
    #[command(subcommand)]
    Snapshot(SnapshotCommands),

    /// Show resolved paths and settings
    Paths,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "resolve_backup=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let reporter = ConsoleReporter;

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) if e.is_config() => report_fatal(&reporter, &e.to_string()),
        Err(e) => return Err(e.into()),
    };

    match cli.command {
        None => handle_run(config, false, &reporter)?,
        Some(Commands::Run { once }) => handle_run(config, once, &reporter)?,
        Some(Commands::Snapshot(cmd)) => handle_snapshot_command(&config, cmd)?,
        Some(Commands::Paths) => {
            println!("Resolve Project Backup Configuration");
            println!("====================================");
            println!("Source:      {}", config.paths.source().display());
            println!("Destination: {}", config.paths.dest().display());
            println!("Log file:    {}", config.paths.log_file().display());
            println!();
            println!("Settings:");
            println!("  Interval: {} minute(s)", config.interval_minutes);
            println!("  Max days: {}", config.max_days);
        }
    }

    Ok(())
}

/// Merge settings file, CLI flags and resolved paths into one frozen config
fn build_config(cli: &Cli) -> resolve_backup::ResolveBackupResult<SchedulerConfig> {
    let settings = Settings::load_or_default(cli.config.as_deref())?
        .with_overrides(cli.interval, cli.max_days);

    let mut paths = match (&cli.source, &cli.dest) {
        (Some(source), Some(dest)) => BackupPaths::with_dirs(source, dest),
        _ => BackupPaths::resolve()?,
    };
    if let Some(source) = &cli.source {
        paths = paths.with_source(source);
    }
    if let Some(dest) = &cli.dest {
        paths = paths.with_dest(dest);
    }

    Ok(SchedulerConfig::new(settings, paths))
}
