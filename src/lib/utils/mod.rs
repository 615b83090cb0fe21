//! Small helpers shared by the CLI and the library.

use std::io;

use anyhow::Error;
use log::info;

/// Returns `true` if the error originated from a broken pipe.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}

/// Logs progress whenever the completed percentage advances.
#[derive(Debug)]
pub struct PercentLogger {
    label: &'static str,
    total: usize,
    current: usize,
    last_percent: usize,
}

impl PercentLogger {
    pub fn new(label: &'static str, total: usize) -> Self {
        Self {
            label,
            total,
            current: 0,
            last_percent: 0,
        }
    }

    /// Advance by `by` items, emitting a log line on each percent step.
    pub fn tick(&mut self, by: usize) {
        if self.total == 0 {
            return;
        }
        self.current += by;
        let percent = (self.current * 100) / self.total;
        if percent != self.last_percent {
            self.last_percent = percent;
            info!("{}: {}% ({}/{})", self.label, percent, self.current, self.total);
        }
    }
}
