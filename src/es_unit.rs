//! ES unit assembly (spec §4.3, component C3).

use crate::byte_source::ByteSource;
use crate::error::{Next, Result};
use crate::logger::Logger;
use crate::startcode::StartcodeScanner;
use std::io::Read;

/// One access unit: a startcode-prefixed run of bytes from an elementary
/// stream (spec §3). `data` always begins with `00 00 01 <sc>`.
#[derive(Debug)]
pub struct EsUnit {
    /// The unit's bytes, starting with its four-byte startcode prefix.
    pub data: Vec<u8>,
    /// Byte offset within the original stream where this unit's startcode
    /// prefix began. Informational only (spec §3).
    pub start_offset: u64,
}

impl EsUnit {
    /// Length of [`EsUnit::data`].
    pub fn data_len(&self) -> usize {
        self.data.len()
    }
}

/// Stateful producer of whole [`EsUnit`]s from a [`ByteSource`].
///
/// REDESIGN FLAG (spec §9): the teacher grows parse buffers with raw
/// pointers and `realloc`. This builder instead owns a plain `Vec<u8>` per
/// unit and hands ownership of the completed unit straight to the caller
/// (who passes it on to [`crate::pes::PesPacker`]); `Vec`'s own amortized
/// doubling growth is the "geometric buffer growth" spec §4.3 asks for, no
/// manual capacity bookkeeping needed.
pub struct EsUnitBuilder<R> {
    source: ByteSource<R>,
    scanner: StartcodeScanner,
    /// Startcode identifier already found while finishing the previous
    /// unit, waiting to seed the next one. `None` only before the very
    /// first unit, or once the stream is exhausted.
    pending_id: Option<u8>,
    offset: u64,
    finished: bool,
}

impl<R: Read> EsUnitBuilder<R> {
    /// Wraps a [`ByteSource`]. No bytes are consumed until the first
    /// [`EsUnitBuilder::next_unit`] call.
    pub fn new(source: ByteSource<R>) -> Self {
        Self {
            source,
            scanner: StartcodeScanner::new(),
            pending_id: None,
            offset: 0,
            finished: false,
        }
    }

    /// Produces the next whole ES unit, or [`Next::Eof`] once the stream is
    /// exhausted. `logger` receives a warning if leading junk bytes are
    /// discarded while locating the very first startcode.
    pub fn next_unit(&mut self, logger: &dyn Logger) -> Result<Next<EsUnit>> {
        if self.finished {
            return Ok(Next::Eof);
        }

        let id = match self.pending_id.take() {
            Some(id) => id,
            None => {
                let mut junk = Vec::new();
                match self.scanner.next_startcode(&mut self.source, &mut junk)? {
                    Next::Eof => {
                        self.finished = true;
                        if !junk.is_empty() {
                            logger.warn(&format!(
                                "discarded {} byte(s) before any startcode was found; \
                                 no startcode present in input",
                                junk.len()
                            ));
                        }
                        return Ok(Next::Eof);
                    }
                    Next::Item(id) => {
                        if !junk.is_empty() {
                            logger.warn(&format!(
                                "discarded {} leading byte(s) before first startcode",
                                junk.len()
                            ));
                        }
                        self.offset += junk.len() as u64;
                        id
                    }
                }
            }
        };

        let start_offset = self.offset;
        let mut data = vec![0x00, 0x00, 0x01, id];
        match self.scanner.next_startcode(&mut self.source, &mut data)? {
            Next::Eof => {
                self.finished = true;
            }
            Next::Item(next_id) => {
                self.pending_id = Some(next_id);
            }
        }
        self.offset = start_offset + data.len() as u64;

        Ok(Next::Item(EsUnit { data, start_offset }))
    }
}
