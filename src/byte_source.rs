//! Buffered, forward-only reader with lookahead (spec §4.1, component C1).
//!
//! Plays the role the teacher's [`crate::slice_reader`]-equivalent (now
//! removed, see DESIGN.md) played for the read side: a small, explicit
//! cursor abstraction other components read through rather than touching
//! `std::io::Read` directly. Unlike a `SliceReader` over an already fully
//! buffered 188-byte packet, this one owns the buffering itself, since the
//! ES input is an unbounded stream that may arrive from a file, a pipe, or
//! a socket.

use crate::error::{ErrorDetails, Next, Result};
use std::io::Read;

/// Buffered front-end over an arbitrary [`Read`] implementation.
///
/// Guarantees at least 12 bytes of lookahead via [`ByteSource::peek`] (spec
/// §4.1), bounded only by how much the caller asks to peek.
pub struct ByteSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

/// Consumed buffer is compacted once the read cursor drifts this far past
/// the front, so long-running conversions don't retain unbounded memory.
const COMPACT_THRESHOLD: usize = 64 * 1024;

impl<R: Read> ByteSource<R> {
    /// Wraps a reader. No bytes are read until the first `peek`/`read_byte`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Fills the buffer until at least `want` bytes are available past the
    /// cursor, or the underlying reader is exhausted.
    fn fill(&mut self, want: usize) -> Result<()> {
        let mut chunk = [0u8; 4096];
        while !self.eof && self.buf.len() - self.pos < want {
            let n = self.reader.read(&mut chunk).map_err(ErrorDetails::from)?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(())
    }

    fn compact(&mut self) {
        if self.pos >= COMPACT_THRESHOLD {
            self.buf.drain(0..self.pos);
            self.pos = 0;
        }
    }

    /// Returns up to `n` bytes ahead of the read cursor without consuming
    /// them. Returns fewer than `n` bytes if the stream ends first.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n)?;
        let available = self.buf.len() - self.pos;
        let take = available.min(n);
        Ok(&self.buf[self.pos..self.pos + take])
    }

    /// Consumes and returns the next byte, or [`Next::Eof`] if the
    /// underlying reader is exhausted.
    pub fn read_byte(&mut self) -> Result<Next<u8>> {
        self.fill(1)?;
        if self.pos >= self.buf.len() {
            return Ok(Next::Eof);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        self.compact();
        Ok(Next::Item(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut src = ByteSource::new([1u8, 2, 3, 4, 5].as_slice());
        assert_eq!(src.peek(3).unwrap(), &[1, 2, 3]);
        assert_eq!(src.peek(5).unwrap(), &[1, 2, 3, 4, 5]);
        assert!(matches!(src.read_byte().unwrap(), Next::Item(1)));
        assert!(matches!(src.read_byte().unwrap(), Next::Item(2)));
    }

    #[test]
    fn peek_past_eof_returns_short_slice() {
        let mut src = ByteSource::new([1u8, 2].as_slice());
        assert_eq!(src.peek(10).unwrap(), &[1, 2]);
    }

    #[test]
    fn read_byte_reports_eof() {
        let mut src = ByteSource::new([1u8].as_slice());
        assert!(matches!(src.read_byte().unwrap(), Next::Item(1)));
        assert!(matches!(src.read_byte().unwrap(), Next::Eof));
        assert!(matches!(src.read_byte().unwrap(), Next::Eof));
    }

    #[test]
    fn compacts_long_runs() {
        let data = vec![0xAAu8; COMPACT_THRESHOLD * 3];
        let mut src = ByteSource::new(data.as_slice());
        for _ in 0..COMPACT_THRESHOLD * 3 {
            assert!(matches!(src.read_byte().unwrap(), Next::Item(0xAA)));
        }
        assert!(matches!(src.read_byte().unwrap(), Next::Eof));
    }
}
