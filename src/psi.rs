//! PSI section construction (spec §4.7, component C7).
//!
//! Reuses the teacher's on-wire bitfield layouts for PAT/PMT sections
//! (`mpegts-io`'s `psi.rs`: `PsiHeader`, `PsiTableSyntax`, `PatEntry`,
//! `PmtHeader`, `ElementaryStreamInfoHeader`), generalized from parsing a
//! section (teacher's `PsiBuilder::finish`) into building one and computing
//! its CRC, instead of validating one already on the wire. `Descriptor`,
//! `ElementaryStreamInfo::es_descriptors`, and `PsiData::{Raw,Nit}` are not
//! carried over: spec §4.7 fixes `program_info_length = 0` and
//! `ES_info_length = 0`, so this crate never builds a descriptor list, and
//! it never encounters tables it didn't itself emit.

use crc::{Crc, CRC_32_MPEG_2};
use modular_bitfield_msb::prelude::*;

/// `table_id` for a Program Association Table (spec §4.7).
pub const PAT_TABLE_ID: u8 = 0x00;
/// `table_id` for a Program Map Table (spec §4.7).
pub const PMT_TABLE_ID: u8 = 0x02;

const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);
const CRC_LEN: usize = 4;

/// The 3-byte section header common to every PSI table (spec §4.7). Same
/// layout as the teacher's parse-side `PsiHeader`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PsiHeader {
    pub table_id: B8,
    pub section_syntax_indicator: bool,
    pub private_bit: bool,
    pub reserved_bits: B2,
    #[skip]
    pub unused_bits: B2,
    pub section_length: B10,
}

/// The 5-byte table-syntax extension following [`PsiHeader`] whenever
/// `section_syntax_indicator` is set (spec §4.7). Same layout as the
/// teacher's parse-side `PsiTableSyntax`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PsiTableSyntax {
    pub table_id_extension: B16,
    pub reserved_bits: B2,
    pub version: B5,
    pub current_next_indicator: bool,
    pub section_num: B8,
    pub last_section_num: B8,
}

/// One PAT (program_number, PMT PID) entry (spec §4.7). Same layout as the
/// teacher's parse-side `PatEntry`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PatEntry {
    pub program_num: B16,
    pub reserved: B3,
    pub program_map_pid: B13,
}

/// PMT's fixed header: PCR PID and program-level descriptor-loop length
/// (spec §4.7, always `0` here). Same layout as the teacher's parse-side
/// `PmtHeader`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PmtHeader {
    pub reserved: B3,
    pub pcr_pid: B13,
    pub reserved2: B4,
    #[skip]
    pub unused_bits: B2,
    pub program_info_length: B10,
}

/// One PMT elementary-stream entry (spec §4.7). Same layout as the
/// teacher's parse-side `ElementaryStreamInfoHeader`.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct ElementaryStreamInfoHeader {
    pub stream_type: B8,
    pub reserved: B3,
    pub elementary_pid: B13,
    pub reserved2: B4,
    #[skip]
    pub unused_bits: B2,
    pub es_info_length: B10,
}

/// Builds the two PSI sections this crate ever emits (spec §4.7).
pub struct PsiTables;

impl PsiTables {
    /// Builds a PAT section declaring exactly one program
    /// (`program_number` → `pmt_pid`), terminated by its CRC-32/MPEG-2.
    pub fn build_pat(transport_stream_id: u16, program_number: u16, pmt_pid: u16) -> Vec<u8> {
        let mut syntax = PsiTableSyntax::new();
        syntax.set_table_id_extension(transport_stream_id);
        syntax.set_reserved_bits(0b11);
        syntax.set_version(0);
        syntax.set_current_next_indicator(true);
        syntax.set_section_num(0);
        syntax.set_last_section_num(0);

        let mut entry = PatEntry::new();
        entry.set_program_num(program_number);
        entry.set_reserved(0b111);
        entry.set_program_map_pid(pmt_pid);

        let mut body = Vec::with_capacity(9);
        body.extend_from_slice(&syntax.into_bytes());
        body.extend_from_slice(&entry.into_bytes());

        build_section(PAT_TABLE_ID, &body)
    }

    /// Builds a PMT section for `program_number` with one elementary stream
    /// (`stream_type`, PID `video_pid`). `PCR_PID` is also set to
    /// `video_pid`: a deliberate simplification (spec §9 Open Question,
    /// recorded in DESIGN.md) since this crate never emits a PCR field on
    /// any adaptation field.
    pub fn build_pmt(program_number: u16, video_pid: u16, stream_type: u8) -> Vec<u8> {
        let mut syntax = PsiTableSyntax::new();
        syntax.set_table_id_extension(program_number);
        syntax.set_reserved_bits(0b11);
        syntax.set_version(0);
        syntax.set_current_next_indicator(true);
        syntax.set_section_num(0);
        syntax.set_last_section_num(0);

        let mut header = PmtHeader::new();
        header.set_reserved(0b111);
        header.set_pcr_pid(video_pid);
        header.set_reserved2(0b1111);
        header.set_program_info_length(0);

        let mut es_header = ElementaryStreamInfoHeader::new();
        es_header.set_stream_type(stream_type);
        es_header.set_reserved(0b111);
        es_header.set_elementary_pid(video_pid);
        es_header.set_reserved2(0b1111);
        es_header.set_es_info_length(0);

        let mut body = Vec::with_capacity(14);
        body.extend_from_slice(&syntax.into_bytes());
        body.extend_from_slice(&header.into_bytes());
        body.extend_from_slice(&es_header.into_bytes());

        build_section(PMT_TABLE_ID, &body)
    }
}

/// Assembles one PSI section: the 3-byte [`PsiHeader`] (`section_length`
/// set to `body.len() + 4`, the MPEG convention of counting every byte
/// after the length field, including the trailing CRC), then `body`, then
/// the CRC-32/MPEG-2 (spec §4.7: polynomial `0x04C11DB7`, initial
/// `0xFFFFFFFF`, no reflection, no final xor) over every byte from
/// `table_id` up to (not including) the CRC itself.
fn build_section(table_id: u8, body: &[u8]) -> Vec<u8> {
    let section_length = (body.len() + CRC_LEN) as u16;

    let mut header = PsiHeader::new();
    header.set_table_id(table_id);
    header.set_section_syntax_indicator(true);
    header.set_private_bit(false);
    header.set_reserved_bits(0b11);
    header.set_section_length(section_length);

    let mut section = Vec::with_capacity(3 + body.len() + CRC_LEN);
    section.extend_from_slice(&header.into_bytes());
    section.extend_from_slice(body);

    let crc = CRC.checksum(&section);
    section.extend_from_slice(&crc.to_be_bytes());
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify_crc(section: &[u8]) -> bool {
        let (body, crc_bytes) = section.split_at(section.len() - CRC_LEN);
        let expected = u32::from_be_bytes(crc_bytes.try_into().unwrap());
        CRC.checksum(body) == expected
    }

    #[test]
    fn pat_has_valid_header_and_crc() {
        let pat = PsiTables::build_pat(1, 1, 0x66);
        assert_eq!(pat[0], PAT_TABLE_ID);
        let header = PsiHeader::from_bytes([pat[0], pat[1], pat[2]]);
        assert!(header.section_syntax_indicator());
        assert_eq!(header.section_length() as usize, pat.len() - 3);
        assert!(verify_crc(&pat));

        let syntax = PsiTableSyntax::from_bytes(pat[3..8].try_into().unwrap());
        assert_eq!(syntax.table_id_extension(), 1);
        let entry = PatEntry::from_bytes(pat[8..12].try_into().unwrap());
        assert_eq!(entry.program_num(), 1);
        assert_eq!(entry.program_map_pid(), 0x66);
    }

    #[test]
    fn pmt_has_valid_header_stream_type_and_crc() {
        let pmt = PsiTables::build_pmt(1, 0x68, 0x1B);
        assert_eq!(pmt[0], PMT_TABLE_ID);
        let header = PsiHeader::from_bytes([pmt[0], pmt[1], pmt[2]]);
        assert_eq!(header.section_length() as usize, pmt.len() - 3);
        assert!(verify_crc(&pmt));

        let pmt_header = PmtHeader::from_bytes(pmt[8..12].try_into().unwrap());
        assert_eq!(pmt_header.pcr_pid(), 0x68);
        assert_eq!(pmt_header.program_info_length(), 0);

        let es_header = ElementaryStreamInfoHeader::from_bytes(pmt[12..17].try_into().unwrap());
        assert_eq!(es_header.stream_type(), 0x1B);
        assert_eq!(es_header.elementary_pid(), 0x68);
        assert_eq!(es_header.es_info_length(), 0);
    }

    #[test]
    fn pmt_fits_in_a_single_ts_payload() {
        // spec §4.7: "sections <= 183 bytes always fit after the 1-byte
        // pointer_field prefix" -- confirm this crate's fixed-shape PMT
        // (no descriptors) is nowhere close to that bound.
        let pmt = PsiTables::build_pmt(1, 0x68, 0x02);
        assert!(pmt.len() + 1 <= 183);
    }
}
