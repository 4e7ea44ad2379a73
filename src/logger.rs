//! Minimal stderr logger for the `log` facade.
//!
//! Filtering is left to `log::set_max_level`; every record that reaches the
//! logger is printed.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

#[derive(Debug)]
pub struct Logger(());

static LOGGER: Logger = Logger(());

impl Logger {
    /// Install the logger globally with the given maximum level.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }
}

/// Map the number of `-v` flags to a level. Warnings are always shown.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl Log for Logger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        eprintln!(
            "{}: {}",
            record.level().as_str().to_lowercase(),
            record.args()
        );
    }

    fn flush(&self) {}
}
