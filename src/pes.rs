//! PES packet construction (spec §4.5, component C5).
//!
//! Reuses the teacher's `PesHeader`/`PesOptionalHeader` bitfield layouts
//! (`mpegts-io`'s `pes.rs`) verbatim, generalized from parsing a packet
//! (`PESHeader::from_bytes`) to building one (`PesHeader::into_bytes`).

use modular_bitfield_msb::prelude::*;

/// Video stream id used for every PES packet this crate emits (spec §3).
pub const STREAM_ID_VIDEO: u8 = 0xE0;

/// `packet_start_code_prefix` + `stream_id` + `PES_packet_length` (spec
/// §4.5). Same layout as the teacher's parse-side `PESHeader`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PesHeader {
    pub start_code: B24,
    pub stream_id: B8,
    pub packet_length: B16,
}

/// The flags1/flags2/`PES_header_data_length` trio (spec §4.5). This crate
/// only ever emits the no-PTS/no-DTS/no-extensions form, but the full
/// bitfield layout is kept so the on-wire shape matches the teacher's
/// parse-side `PESOptionalHeader` exactly.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PesOptionalHeader {
    pub marker_bits: B2,
    pub scrambling_control: B2,
    pub priority: bool,
    pub data_alignment_indicator: bool,
    pub copyright: bool,
    pub original: bool,
    pub has_pts: bool,
    pub has_dts: bool,
    pub escr: bool,
    pub es_rate: bool,
    pub dsm_trick_mode: bool,
    pub has_additional_copy_info: bool,
    pub has_crc: bool,
    pub has_extension: bool,
    pub additional_header_length: B8,
}

/// Builds PES packets for this crate's fixed policy: one ES unit per PES
/// packet, no PTS/DTS, no scrambling.
pub struct PesPacker;

impl PesPacker {
    /// Wraps `unit_data` (a complete [`crate::es_unit::EsUnit::data`]) in a
    /// PES packet, per the layout in spec §4.5.
    ///
    /// `PES_packet_length` is set to the header-plus-payload length when it
    /// fits in 16 bits, or to `0` ("unbounded") when the unit is too large
    /// — permitted by H.222 for video streams only, which is the only kind
    /// of stream this crate's `stream_id` (`0xE0`) ever declares.
    pub fn pack(unit_data: &[u8]) -> Vec<u8> {
        const OPTIONAL_HEADER_LEN: usize = 3;

        let body_len = OPTIONAL_HEADER_LEN + unit_data.len();
        let packet_length: u16 = if body_len > 0xFFFF {
            0
        } else {
            body_len as u16
        };

        let mut header = PesHeader::new();
        header.set_start_code(0x0000_01);
        header.set_stream_id(STREAM_ID_VIDEO);
        header.set_packet_length(packet_length);

        let mut optional = PesOptionalHeader::new();
        optional.set_marker_bits(0b10);
        // Every other field (scrambling, alignment, copyright, PTS/DTS,
        // ESCR, ES rate, trick mode, extra copy info, CRC, extension,
        // additional_header_length) defaults to zero/false, which is
        // exactly flags2 = 0x00 and PES_header_data_length = 0.

        let mut out = Vec::with_capacity(6 + OPTIONAL_HEADER_LEN + unit_data.len());
        out.extend_from_slice(&header.into_bytes());
        out.extend_from_slice(&optional.into_bytes());
        out.extend_from_slice(unit_data);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_small_unit_with_explicit_length() {
        let unit = [0x00, 0x00, 0x01, 0xB3, 0xAA, 0xBB];
        let pes = PesPacker::pack(&unit);
        assert_eq!(&pes[0..3], &[0x00, 0x00, 0x01]);
        assert_eq!(pes[3], STREAM_ID_VIDEO);
        let len = u16::from_be_bytes([pes[4], pes[5]]);
        assert_eq!(len as usize, 3 + unit.len());
        assert_eq!(pes[6], 0x80);
        assert_eq!(pes[7], 0x00);
        assert_eq!(pes[8], 0x00);
        assert_eq!(&pes[9..], &unit[..]);
    }

    #[test]
    fn packs_oversized_unit_with_unbounded_length() {
        let unit = vec![0u8; 0x10000];
        let pes = PesPacker::pack(&unit);
        let len = u16::from_be_bytes([pes[4], pes[5]]);
        assert_eq!(len, 0);
        assert_eq!(pes.len(), 9 + unit.len());
    }
}
