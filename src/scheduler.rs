//! Backup scheduler loop
//!
//! One cycle takes a snapshot of the source, logs it, prunes expired
//! snapshots and then waits for the configured interval. Cycles never overlap:
//! the next timestamp is taken only after the previous cycle has finished.
//!
//! The wait between cycles goes through a [`Ticker`], which can be cut short
//! from a [`ShutdownHandle`] to stop the loop cleanly.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::backup::archive::{archive_directory, archive_size, ArchiveStats};
use crate::backup::log::BackupLog;
use crate::backup::naming::{format_timestamp, snapshot_base_name};
use crate::backup::retention::{self, SweepReport};
use crate::config::SchedulerConfig;
use crate::error::{ResolveBackupError, ResolveBackupResult};

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// The real local clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Requests the scheduler loop to stop at its next wait
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        // The ticker may already be gone, which is fine
        let _ = self.tx.send(());
    }
}

/// Cancellable wait between cycles
#[derive(Debug)]
pub struct Ticker {
    rx: Receiver<()>,
    stopped: Cell<bool>,
}

/// Create a ticker and the handle that cancels it
pub fn ticker() -> (Ticker, ShutdownHandle) {
    let (tx, rx) = mpsc::channel();
    (
        Ticker {
            rx,
            stopped: Cell::new(false),
        },
        ShutdownHandle { tx },
    )
}

impl Ticker {
    /// Wait for `period`
    ///
    /// Returns `false` as soon as shutdown has been requested, `true` if the
    /// full period elapsed.
    pub fn wait(&self, period: Duration) -> bool {
        if self.stopped.get() {
            return false;
        }

        match self.rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) => {
                self.stopped.set(true);
                false
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Nobody can cancel any more; fall back to a plain sleep
                std::thread::sleep(period);
                true
            }
        }
    }
}

/// Result of one backup cycle
#[derive(Debug)]
pub struct CycleReport {
    /// Wall-clock time the snapshot is named after
    pub taken_at: DateTime<Local>,
    /// Full path of the archive written
    pub snapshot: PathBuf,
    pub stats: ArchiveStats,
    pub sweep: SweepReport,
}

impl CycleReport {
    /// File name of the snapshot (`ResolveProjBackup_<token>.zip`)
    pub fn file_name(&self) -> String {
        self.snapshot
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Drives backup cycles for one destination
pub struct Scheduler<C: Clock = SystemClock> {
    config: SchedulerConfig,
    clock: C,
    log: BackupLog,
    /// Base name of the last snapshot written by this scheduler
    last_snapshot: RefCell<Option<String>>,
}

impl Scheduler<SystemClock> {
    /// Create a scheduler using the real clock
    pub fn with_system_clock(config: SchedulerConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(config: SchedulerConfig, clock: C) -> Self {
        let log = BackupLog::new(config.paths.log_file());
        Self {
            config,
            clock,
            log,
            last_snapshot: RefCell::new(None),
        }
    }

    pub fn log(&self) -> &BackupLog {
        &self.log
    }

    /// Prepare the destination before the first cycle
    ///
    /// Fails with a configuration error if the source is not a directory, and
    /// with a destination setup error if the destination or log cannot be
    /// created. Safe to call repeatedly.
    pub fn startup(&self) -> ResolveBackupResult<()> {
        let paths = &self.config.paths;
        paths.validate_source()?;
        paths.ensure_dest()?;

        if self.log.ensure_header()? {
            info!(log = %self.log.path().display(), "Created backup log");
        }

        info!(
            source = %paths.source().display(),
            dest = %paths.dest().display(),
            interval_minutes = self.config.interval_minutes,
            max_days = self.config.max_days,
            "Backup scheduler ready"
        );

        Ok(())
    }

    /// Run a single cycle: snapshot, log entry, retention sweep
    pub fn run_cycle(&self) -> ResolveBackupResult<CycleReport> {
        let paths = &self.config.paths;

        let taken_at = self.next_timestamp();
        let base_name = snapshot_base_name(&taken_at);
        if self.last_snapshot.borrow().as_deref() == Some(base_name.as_str()) {
            return Err(ResolveBackupError::Archive(format!(
                "Snapshot {} was already taken this second",
                base_name
            )));
        }
        let snapshot = paths.snapshot_path(&base_name);

        info!(
            snapshot = %snapshot.display(),
            at = %format_timestamp(&taken_at),
            "Creating snapshot"
        );
        let stats = archive_directory(paths.source(), &snapshot)?;

        let file_name = format!("{}.zip", base_name);
        *self.last_snapshot.borrow_mut() = Some(base_name);
        self.log.record_created(&file_name)?;
        info!(
            snapshot = %file_name,
            files = stats.files,
            bytes = stats.bytes,
            archive_bytes = archive_size(&snapshot).unwrap_or(0),
            "Snapshot created"
        );

        let sweep = self.prune()?;

        Ok(CycleReport {
            taken_at,
            snapshot,
            stats,
            sweep,
        })
    }

    /// Sample the clock, waiting for the next second if the previous
    /// snapshot was named after the current one
    fn next_timestamp(&self) -> DateTime<Local> {
        let now = self.clock.now();
        let same_second = self.last_snapshot.borrow().as_deref()
            == Some(snapshot_base_name(&now).as_str());
        if !same_second {
            return now;
        }

        let nanos = u64::from(now.timestamp_subsec_nanos().min(999_999_999));
        std::thread::sleep(Duration::from_nanos(1_000_000_000 - nanos));
        self.clock.now()
    }

    /// Delete expired snapshots, measuring age from a single `now`
    pub fn prune(&self) -> ResolveBackupResult<SweepReport> {
        let now = SystemTime::from(self.clock.now());
        let report = retention::sweep(self.config.paths.dest(), now, self.config.max_days)?;

        if !report.deleted.is_empty() || !report.is_clean() {
            info!(
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "Retention sweep finished"
            );
        }

        Ok(report)
    }

    /// Run cycles until the ticker is cancelled
    ///
    /// A failed cycle is logged and the loop carries on with the next one.
    /// Returns the number of cycles attempted.
    pub fn run(&self, ticker: &Ticker) -> u64 {
        let period = self.config.period();
        let mut cycles = 0;

        loop {
            cycles += 1;
            match self.run_cycle() {
                Ok(report) => {
                    for (path, e) in &report.sweep.failed {
                        warn!(snapshot = %path.display(), error = %e, "Snapshot left in place");
                    }
                }
                Err(e) => {
                    error!(cycle = cycles, error = %e, "Backup cycle failed");
                }
            }

            if !ticker.wait(period) {
                info!(cycles, "Backup scheduler stopped");
                return cycles;
            }
        }
    }
}
