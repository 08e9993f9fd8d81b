//! Error taxonomy (spec §7) for the ES→TS packetizer.
//!
//! Mirrors the split the teacher's parser uses between a located wrapper and
//! a details enum (see `mpegts-io`'s `Error`/`ErrorDetails`), minus the
//! `AppDetails` generic extension point: this crate has no application-defined
//! payload parsers, so no type parameter is needed.

use std::fmt;
use std::io;

/// Errors surfaced by this crate.
///
/// `BudgetReached` (spec §7) is deliberately not a variant here: the spec
/// itself says it "is not an error; clean shutdown", so it is modeled as a
/// plain loop termination in [`crate::pipeline::Pipeline::run`] instead.
#[derive(Debug)]
pub enum ErrorDetails {
    /// Sink or source failure.
    Io(io::Error),
    /// `StartcodeScanner` was exhausted without finding any startcode
    /// prefix (`00 00 01`) anywhere in the input.
    MalformedInput,
    /// Auto-detection observed startcodes but none matched a known codec
    /// family, and no forced type was configured.
    UnknownStreamType,
    /// A [`crate::config::PipelineConfig`] value failed validation; the
    /// string names which check failed.
    InvalidConfig(&'static str),
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetails::Io(e) => write!(f, "I/O error: {e}"),
            ErrorDetails::MalformedInput => {
                write!(f, "input contained no MPEG startcode prefix")
            }
            ErrorDetails::UnknownStreamType => {
                write!(f, "unable to classify elementary stream and no type was forced")
            }
            ErrorDetails::InvalidConfig(why) => write!(f, "invalid configuration: {why}"),
        }
    }
}

impl std::error::Error for ErrorDetails {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ErrorDetails::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ErrorDetails {
    fn from(e: io::Error) -> Self {
        ErrorDetails::Io(e)
    }
}

/// [`std::result::Result`] alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ErrorDetails>;

/// Generalizes the teacher's `Payload::*Pending` split (incomplete vs.
/// complete parse) to this crate's pull-based producers: either the next
/// item, or a clean end of stream. REDESIGN FLAG (spec §9): replaces
/// "error signaling via integer returns mixed with EOF sentinels".
#[derive(Debug)]
pub enum Next<T> {
    /// A fully produced item.
    Item(T),
    /// The underlying stream is exhausted; no more items will follow.
    Eof,
}
