//! Fatal error reporting
//!
//! How a fatal message reaches the operator is pluggable: the binary uses the
//! console, a GUI front-end could pop up a dialog. Either way the process exits
//! with a non-zero status after the message is presented.

use std::io::{self, Write};

/// Exit status used after a fatal report
pub const FATAL_EXIT_CODE: i32 = 1;

/// Presents fatal messages to the operator
pub trait FatalReporter {
    fn present(&self, message: &str);
}

/// Writes fatal messages to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl FatalReporter for ConsoleReporter {
    fn present(&self, message: &str) {
        let _ = write_report(&mut io::stderr().lock(), message);
    }
}

fn write_report(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "Resolve Project Backup: {}", message)?;
    out.flush()
}

/// Present `message` and terminate the process
pub fn report_fatal(reporter: &dyn FatalReporter, message: &str) -> ! {
    reporter.present(message);
    std::process::exit(FATAL_EXIT_CODE)
}
