//! Error delivery strategies.
//!
//! The controller routes every error leaving a public operation through one
//! [`ErrorDelivery`], chosen when the controller is built. Library callers
//! normally keep [`Propagate`]; the command-line front end uses
//! [`ReportAndHalt`] to print a single line and exit.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::error::NBudgetError;

/// Exit status used when an error halts the process.
pub const HALT_STATUS: i32 = 1;

/// Decides what happens to an error before it reaches the caller.
pub trait ErrorDelivery: core::fmt::Debug {
    /// Delivers `error`, returning the error the caller should see.
    ///
    /// Implementations may not return at all.
    fn deliver(&self, error: NBudgetError) -> NBudgetError;
}

/// Hands errors back to the caller unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Propagate;

impl ErrorDelivery for Propagate {
    #[inline]
    fn deliver(&self, error: NBudgetError) -> NBudgetError {
        error
    }
}

/// Writes `[!] Error: <kind>: <message>` to a sink, then halts.
pub struct ReportAndHalt {
    /// Where the report line is written.
    sink: Mutex<Box<dyn Write + Send>>,
    /// Called with [`HALT_STATUS`] after reporting.
    halt: fn(i32) -> !,
}

impl ReportAndHalt {
    /// Reports to `sink` and halts with `halt`.
    #[inline]
    #[must_use]
    pub fn new<W: Write + Send + 'static>(sink: W, halt: fn(i32) -> !) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            halt,
        }
    }

    /// Reports to stderr and exits the process.
    #[inline]
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr(), exit_process)
    }

    /// Formats the report line for `error`.
    #[inline]
    #[must_use]
    pub fn report_line(error: &NBudgetError) -> String {
        format!("[!] Error: {}: {error}", error.kind())
    }
}

impl core::fmt::Debug for ReportAndHalt {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReportAndHalt").finish_non_exhaustive()
    }
}

impl ErrorDelivery for ReportAndHalt {
    #[inline]
    fn deliver(&self, error: NBudgetError) -> NBudgetError {
        tracing::debug!(kind = error.kind(), "halting on error");
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _written = writeln!(sink, "{}", Self::report_line(&error));
        let _flushed = sink.flush();
        drop(sink);
        (self.halt)(HALT_STATUS)
    }
}

/// Terminates the process with `status`.
#[allow(clippy::exit, reason = "reporting mode ends the process by contract")]
fn exit_process(status: i32) -> ! {
    std::process::exit(status)
}
