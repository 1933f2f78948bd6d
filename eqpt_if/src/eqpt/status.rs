//! # Status display interface
//!
//! Human readable diagnostics. Nothing written here is ever read back by the
//! navigation software.

use log::info;

/// A sink for status text, for example a driver station display.
pub trait StatusSink {
    /// Display the status text for the named source, replacing any previous
    /// text from that source.
    fn status(&mut self, source: &str, text: &str);
}

/// Status sink which forwards all text to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn status(&mut self, source: &str, text: &str) {
        info!("* {}\n{}", source, text);
    }
}
