//! Logging setup
//!
//! Every executable logs through the `log` facade. [`logger_init`] routes records to stdout and to
//! the session's log file, prefixing each line with the seconds elapsed since the session epoch
//! and a coloured level tag.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets logged at a lower level than the rest.
///
/// The simulator traces every kinematic step, which would bury the controller's own trace.
const QUIET_TARGETS: [(&str, LevelFilter); 1] = [("nav_lib::sim", LevelFilter::Debug)];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include INFO, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Cannot open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Cannot install the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger for this execution.
///
/// `min_level` must let INFO records through, since mission milestones are logged at INFO. Only
/// one logger can be installed per process, a second call returns `FernInitError`.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}",
                session::get_elapsed_seconds(),
                level_tag(record.level()),
                Body(message, record)
            ))
        })
        .level(min_level);

    for (target, level) in QUIET_TARGETS.iter() {
        dispatch = dispatch.level_for(*target, std::cmp::min(*level, min_level));
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised at {:?}", min_level);
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE ITEMS
// ---------------------------------------------------------------------------

/// Message body, with the target prepended below INFO.
struct Body<'a, 'b>(&'a Arguments<'b>, &'a Record<'b>);

impl<'a, 'b> std::fmt::Display for Body<'a, 'b> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.1.level() > Level::Info {
            write!(f, "{}: {}", self.1.target(), self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Three letter tag for a level.
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_quiet_min_level() {
        let dir = std::env::temp_dir().join(format!("util_logger_test_{}", std::process::id()));
        let session = Session::new_in(&dir, "logger_test").unwrap();

        assert!(matches!(
            logger_init(LevelFilter::Warn, &session),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_level_tags() {
        for level in &[
            Level::Trace,
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
        ] {
            assert_eq!(level_tag(*level).len(), 3);
        }
    }
}
