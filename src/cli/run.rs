//! The `run` command: startup followed by the backup loop

use tracing::info;

use crate::config::SchedulerConfig;
use crate::error::ResolveBackupResult;
use crate::report::{report_fatal, FatalReporter};
use crate::scheduler::{ticker, Scheduler};

/// Start the scheduler
///
/// Configuration and destination setup failures go to `reporter`, which
/// ends the process; any other startup error is returned. With `once`
/// a single cycle runs and its error, if any, is returned.
pub fn handle_run(
    config: SchedulerConfig,
    once: bool,
    reporter: &dyn FatalReporter,
) -> ResolveBackupResult<()> {
    let scheduler = Scheduler::with_system_clock(config);

    match scheduler.startup() {
        Ok(()) => {}
        Err(e) if e.is_fatal_at_startup() => report_fatal(reporter, &e.to_string()),
        Err(e) => return Err(e),
    }

    if once {
        let report = scheduler.run_cycle()?;
        println!("Created {}", report.file_name());
        if !report.sweep.deleted.is_empty() {
            println!("Pruned {} expired snapshot(s)", report.sweep.deleted.len());
        }
        return Ok(());
    }

    // Keep the handle alive so the ticker waits on a connected channel
    let (ticker, _shutdown) = ticker();
    let cycles = scheduler.run(&ticker);
    info!(cycles, "Scheduler exited");

    Ok(())
}
