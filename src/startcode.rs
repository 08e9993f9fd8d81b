//! Startcode scanning (spec §4.2, component C2).
//!
//! Finds `00 00 01 <sc>` prefixes in a [`ByteSource`]. Tolerant of any
//! number of leading zero bytes before the final `00 00 01` (MPEG stuffing
//! convention): it recognizes a prefix on seeing at least two `0x00` bytes
//! immediately followed by `0x01`, same as a classic MPEG startcode scan.
//!
//! This mirrors the accumulate-then-recognize shape of the teacher's
//! `SpanObject::extend_from_slice` (see `span.rs`, removed — see
//! DESIGN.md): bytes that are not part of a newly recognized prefix are
//! pushed into a caller-supplied sink as they're read, rather than
//! returned piecemeal.

use crate::byte_source::ByteSource;
use crate::error::{Next, Result};
use std::io::Read;

/// Stateless; all state needed to find the next startcode lives in the
/// [`ByteSource`] cursor and the caller's accumulation buffer.
#[derive(Debug, Default)]
pub struct StartcodeScanner;

impl StartcodeScanner {
    /// Creates a scanner.
    pub fn new() -> Self {
        Self
    }

    /// Reads forward from `source`, pushing every byte that is not part of
    /// a newly found startcode prefix into `sink`. Returns the one-byte
    /// startcode identifier of the prefix found, or [`Next::Eof`] if the
    /// source is exhausted first.
    ///
    /// On return, `sink` holds exactly the bytes that precede the found
    /// prefix (the canonical `00 00 01` that was just matched is stripped
    /// back out of `sink`, since those three bytes belong to the *new*
    /// unit, not whatever `sink` is accumulating for the caller).
    pub fn next_startcode<R: Read>(
        &mut self,
        source: &mut ByteSource<R>,
        sink: &mut Vec<u8>,
    ) -> Result<Next<u8>> {
        loop {
            match source.read_byte()? {
                Next::Eof => return Ok(Next::Eof),
                Next::Item(b) => {
                    sink.push(b);
                    let len = sink.len();
                    if b == 0x01 && len >= 3 && sink[len - 3] == 0x00 && sink[len - 2] == 0x00 {
                        sink.truncate(len - 3);
                        return match source.read_byte()? {
                            Next::Item(id) => Ok(Next::Item(id)),
                            // A bare "00 00 01" with nothing after it: no
                            // identifier byte exists to report. Treated as
                            // end of stream; the truncated prefix bytes are
                            // simply dropped.
                            Next::Eof => Ok(Next::Eof),
                        };
                    }
                }
            }
        }
    }
}
