//! Transport Stream packetization (spec §4.6, component C6).
//!
//! `PacketHeader`/`AdaptationFieldHeader`/`TransportScramblingControl` are
//! the teacher's own bitfield layouts (formerly in `lib.rs`), reused
//! unchanged for writing instead of parsing.

use crate::error::Result;
use modular_bitfield_msb::prelude::*;
use std::io::Write;

/// Size of every TS packet (spec §3).
pub const PACKET_LEN: usize = 188;
const HEADER_LEN: usize = 4;

/// TSC field of the TS header. This crate only ever writes `NotScrambled`
/// (spec §4.6), but the full enum is kept so the on-wire shape matches the
/// teacher's parse-side `TransportScramblingControl` exactly.
#[derive(BitfieldSpecifier, Debug, Clone, Copy, PartialEq, Eq)]
#[bits = 2]
pub enum TransportScramblingControl {
    /// Not scrambled.
    NotScrambled,
    /// Do not use.
    Reserved,
    /// Scrambled with even key.
    ScrambledEvenKey,
    /// Scrambled with odd key.
    ScrambledOddKey,
}

/// The fixed four-byte TS packet header (spec §4.6).
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PacketHeader {
    pub sync_byte: B8,
    pub tei: bool,
    pub pusi: bool,
    pub priority: bool,
    pub pid: B13,
    pub tsc: TransportScramblingControl,
    pub has_adaptation_field: bool,
    pub has_payload: bool,
    pub continuity_counter: B4,
}

/// The adaptation field's one-byte flags header, following its length byte
/// (spec §4.6). This crate only ever emits stuffing, so every flag stays
/// false; the layout is kept intact for fidelity to the on-wire shape.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct AdaptationFieldHeader {
    pub length: B8,
    pub discontinuity: bool,
    pub random_access: bool,
    pub priority: bool,
    pub has_pcr: bool,
    pub has_opcr: bool,
    pub has_splice_countdown: bool,
    pub has_transport_private_data: bool,
    pub has_adaptation_field_extension: bool,
}

const SYNC_BYTE: u8 = 0x47;

/// Per-PID 4-bit continuity counters (spec §4.6). The teacher's parser
/// tracks these only to validate a counter sequence it reads; this side
/// instead generates the sequence, one counter per PID, wrapping at 16.
#[derive(Debug, Default)]
pub struct ContinuityCounters {
    counters: std::collections::HashMap<u16, u8>,
}

impl ContinuityCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next counter value for `pid` and advances it, wrapping
    /// from 15 back to 0 (spec §4.6).
    fn next(&mut self, pid: u16) -> u8 {
        let counter = self.counters.entry(pid).or_insert(0);
        let value = *counter;
        *counter = (*counter + 1) & 0x0F;
        value
    }
}

/// Anything TS packets can be written to. A blanket impl covers every
/// [`Write`] implementor, so `Vec<u8>`, files, and sockets all work without
/// this crate needing its own output-transport code (a Non-goal, spec §6).
pub trait ByteSink {
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

impl<W: Write> ByteSink for W {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        Write::write_all(self, data).map_err(Into::into)
    }
}

/// Fragments PSI sections and PES packets into 188-byte TS packets (spec
/// §4.6).
pub struct TsPacketizer {
    counters: ContinuityCounters,
}

impl TsPacketizer {
    pub fn new() -> Self {
        Self {
            counters: ContinuityCounters::new(),
        }
    }

    /// Writes a PSI section (PAT or PMT) as TS packets on `pid`.
    ///
    /// PSI sections carry a `pointer_field` byte (spec §4.7) immediately
    /// after `payload_unit_start_indicator`'s packet's header, giving the
    /// offset (always `0` here, since a section always starts a fresh
    /// packet) to the first section byte.
    pub fn write_section<S: ByteSink>(
        &mut self,
        sink: &mut S,
        pid: u16,
        section: &[u8],
    ) -> Result<()> {
        let mut payload = Vec::with_capacity(1 + section.len());
        payload.push(0x00);
        payload.extend_from_slice(section);
        self.write_payload(sink, pid, &payload, true)
    }

    /// Writes a PES packet as TS packets on `pid`.
    pub fn write_pes<S: ByteSink>(&mut self, sink: &mut S, pid: u16, pes: &[u8]) -> Result<()> {
        self.write_payload(sink, pid, pes, true)
    }

    /// Fragments `payload` across as many 188-byte packets as needed.
    /// `payload_unit_start` marks the first packet's `pusi` bit, per spec
    /// §4.6 ("exactly one PUSI=1 packet per PES/PSI unit").
    fn write_payload<S: ByteSink>(
        &mut self,
        sink: &mut S,
        pid: u16,
        payload: &[u8],
        payload_unit_start: bool,
    ) -> Result<()> {
        let mut offset = 0;
        let mut first = true;
        while offset < payload.len() || first {
            let remaining = payload.len() - offset;
            let capacity = PACKET_LEN - HEADER_LEN;
            let chunk_len = remaining.min(capacity);
            let stuffing_len = capacity - chunk_len;

            let mut header = PacketHeader::new();
            header.set_sync_byte(SYNC_BYTE);
            header.set_pusi(first && payload_unit_start);
            header.set_pid(pid);
            header.set_tsc(TransportScramblingControl::NotScrambled);
            header.set_has_adaptation_field(stuffing_len > 0);
            header.set_has_payload(true);
            header.set_continuity_counter(self.counters.next(pid));

            let mut packet = Vec::with_capacity(PACKET_LEN);
            packet.extend_from_slice(&header.into_bytes());
            if stuffing_len > 0 {
                write_adaptation_stuffing(&mut packet, stuffing_len);
            }
            packet.extend_from_slice(&payload[offset..offset + chunk_len]);

            debug_assert_eq!(packet.len(), PACKET_LEN);
            sink.write_all(&packet)?;

            offset += chunk_len;
            first = false;
        }
        Ok(())
    }
}

impl Default for TsPacketizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends an adaptation field of exactly `stuffing_len` bytes (the number
/// of payload bytes it is standing in for), filled with `0xFF` stuffing
/// (spec §4.6).
///
/// `stuffing_len == 1` is the degenerate case: the adaptation field is a
/// single length byte whose value is `0`, declaring a field with no flags
/// byte and no stuffing bytes at all — that one byte of adaptation field
/// *is* the byte "spent" in place of payload. Every other case carries a
/// flags byte (all flags clear) followed by `stuffing_len - 2` stuffing
/// bytes.
fn write_adaptation_stuffing(packet: &mut Vec<u8>, stuffing_len: usize) {
    if stuffing_len == 1 {
        packet.push(0x00);
        return;
    }

    let mut field = AdaptationFieldHeader::new();
    field.set_length((stuffing_len - 1) as u8);
    packet.extend_from_slice(&field.into_bytes());
    packet.resize(packet.len() + stuffing_len - 2, 0xFF);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_section_fits_in_one_packet_with_stuffing() {
        let mut sink = Vec::new();
        let mut packetizer = TsPacketizer::new();
        let section = vec![0xAAu8; 20];
        packetizer.write_section(&mut sink, 0x100, &section).unwrap();

        assert_eq!(sink.len(), PACKET_LEN);
        assert_eq!(sink[0], SYNC_BYTE);
        let header = PacketHeader::from_bytes([sink[0], sink[1], sink[2], sink[3]]);
        assert!(header.pusi());
        assert_eq!(header.pid(), 0x100);
        assert!(header.has_adaptation_field());
        assert_eq!(header.continuity_counter(), 0);
    }

    #[test]
    fn long_payload_spans_multiple_packets() {
        let mut sink = Vec::new();
        let mut packetizer = TsPacketizer::new();
        let pes = vec![0x55u8; 500];
        packetizer.write_pes(&mut sink, 0x101, &pes).unwrap();

        assert_eq!(sink.len() % PACKET_LEN, 0);
        let packet_count = sink.len() / PACKET_LEN;
        assert!(packet_count >= 3);

        for i in 0..packet_count {
            let packet = &sink[i * PACKET_LEN..(i + 1) * PACKET_LEN];
            assert_eq!(packet[0], SYNC_BYTE);
            let header = PacketHeader::from_bytes([packet[0], packet[1], packet[2], packet[3]]);
            assert_eq!(header.pusi(), i == 0);
            assert_eq!(header.continuity_counter(), i as u8);
        }
    }

    #[test]
    fn continuity_counters_are_independent_per_pid() {
        let mut sink = Vec::new();
        let mut packetizer = TsPacketizer::new();
        packetizer.write_section(&mut sink, 0x0, &[0xAA]).unwrap();
        packetizer.write_section(&mut sink, 0x1, &[0xBB]).unwrap();
        packetizer.write_section(&mut sink, 0x0, &[0xCC]).unwrap();

        let cc = |i: usize| {
            let packet = &sink[i * PACKET_LEN..(i + 1) * PACKET_LEN];
            PacketHeader::from_bytes([packet[0], packet[1], packet[2], packet[3]])
                .continuity_counter()
        };
        assert_eq!(cc(0), 0);
        assert_eq!(cc(1), 0);
        assert_eq!(cc(2), 1);
    }

    #[test]
    fn degenerate_one_byte_adaptation_field() {
        let mut packet = Vec::new();
        write_adaptation_stuffing(&mut packet, 1);
        assert_eq!(packet, vec![0x00]);
    }

    #[test]
    fn adaptation_field_with_flags_and_stuffing() {
        let mut packet = Vec::new();
        write_adaptation_stuffing(&mut packet, 5);
        assert_eq!(packet.len(), 5);
        assert_eq!(packet[0], 4);
        assert_eq!(packet[1], 0x00);
        assert_eq!(&packet[2..], &[0xFF, 0xFF, 0xFF]);
    }
}
