//! Explicit logging seam.
//!
//! REDESIGN FLAG (spec §9): the teacher calls `log::warn!` directly, as a
//! process-wide global, from deep inside its parsing code. This crate
//! instead threads a [`Logger`] through [`crate::pipeline::Pipeline`]
//! construction, so no part of the crate implicitly reaches for global
//! logging state. [`LogCrateLogger`] is the default implementation and is
//! the only place that actually calls into the `log` crate, keeping the
//! ambient logging dependency the teacher already carries while removing
//! the implicit global.

/// Minimal sink for the two severities this crate ever emits.
pub trait Logger {
    /// A condition worth a human's attention but not fatal to the pipeline
    /// (e.g. discarding leading junk bytes before the first startcode).
    fn warn(&self, message: &str);
    /// Routine progress information (e.g. the budget cap being reached).
    fn info(&self, message: &str);
}

/// Forwards to the `log` crate's `warn!`/`info!` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateLogger;

impl Logger for LogCrateLogger {
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn info(&self, message: &str) {
        log::info!("{message}");
    }
}

/// Discards everything. Useful for tests and for callers that want silence.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(&self, _message: &str) {}

    fn info(&self, _message: &str) {}
}
