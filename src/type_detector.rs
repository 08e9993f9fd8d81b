//! Stream classification (spec §4.4, component C4).

use crate::byte_source::ByteSource;
use crate::error::Result;
use enum_dispatch::enum_dispatch;
use std::io::Read;

/// Elementary stream codec family (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    /// ITU-T H.262 / ISO/IEC 13818-2 (MPEG-2 video).
    H262,
    /// ITU-T H.264 / ISO/IEC 14496-10 (AVC).
    H264,
    /// AVS (GB/T 20090.2).
    Avs,
    /// No classification could be made.
    Unknown,
}

impl StreamType {
    /// The PMT `stream_type` byte this codec family maps to (spec §3).
    pub fn stream_type_byte(self) -> u8 {
        match self {
            StreamType::H262 => 0x02,
            StreamType::H264 => 0x1B,
            StreamType::Avs => 0x42,
            StreamType::Unknown => 0x00,
        }
    }
}

/// How many startcodes, or how many bytes, auto-detection is willing to
/// look at before giving up (spec §9 Open Question: "peek at least 16
/// startcodes or 4 KiB, whichever comes first").
const MAX_STARTCODES: usize = 16;
const MAX_PEEK_BYTES: usize = 4096;

/// Outcome of a detection pass, distinguishing "nothing to go on" from
/// "saw data that matched no known codec". Resolves an ambiguity in spec
/// §4.4/§8 scenario 6: an empty (or startcode-free) input still succeeds
/// with an H.262 default, the same default already specified for
/// non-seekable sources, rather than being treated as a fatal
/// classification failure — there being literally no evidence is not the
/// same as having seen a clash of evidence against every known codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// A codec family was confidently identified.
    Classified(StreamType),
    /// At least one candidate codec surfaced, but none reached confidence.
    Ambiguous,
    /// No startcode was observed in the lookahead window at all.
    NoEvidence,
}

#[enum_dispatch]
trait CodecHeuristic {
    /// Feed the next startcode identifier byte observed in the window.
    fn observe(&mut self, id: u8);
    /// Whether this heuristic has seen enough to confirm its codec family.
    fn confirmed(&self) -> bool;
}

#[derive(Default)]
struct H262Heuristic {
    saw_sequence_header: bool,
    saw_picture_or_slice: bool,
}

impl CodecHeuristic for H262Heuristic {
    fn observe(&mut self, id: u8) {
        if id == 0xB3 {
            self.saw_sequence_header = true;
        } else if id == 0x00 || (0x01..=0xAF).contains(&id) {
            self.saw_picture_or_slice = true;
        }
    }

    fn confirmed(&self) -> bool {
        self.saw_sequence_header && self.saw_picture_or_slice
    }
}

#[derive(Default)]
struct AvsHeuristic {
    saw_sequence_start: bool,
}

impl CodecHeuristic for AvsHeuristic {
    fn observe(&mut self, id: u8) {
        if id == 0xB0 {
            self.saw_sequence_start = true;
        }
    }

    fn confirmed(&self) -> bool {
        self.saw_sequence_start
    }
}

#[derive(Default)]
struct H264Heuristic {
    saw_prominent_nal: bool,
}

impl CodecHeuristic for H264Heuristic {
    fn observe(&mut self, id: u8) {
        if matches!(id & 0x1F, 1 | 5 | 7 | 8 | 9) {
            self.saw_prominent_nal = true;
        }
    }

    fn confirmed(&self) -> bool {
        self.saw_prominent_nal
    }
}

#[enum_dispatch(CodecHeuristic)]
enum Heuristic {
    H262(H262Heuristic),
    Avs(AvsHeuristic),
    H264(H264Heuristic),
}

/// Scans for startcodes in `window` the same way [`crate::startcode`] does,
/// but read-only and without needing a [`crate::error::Next`]/EOF split:
/// the window is already a fully buffered slice.
fn startcode_ids(window: &[u8], limit: usize) -> Vec<u8> {
    let mut ids = Vec::new();
    let mut i = 0;
    while i + 3 < window.len() && ids.len() < limit {
        if window[i] == 0x00 && window[i + 1] == 0x00 && window[i + 2] == 0x01 {
            ids.push(window[i + 3]);
            i += 4;
        } else {
            i += 1;
        }
    }
    ids
}

/// Classifies an elementary stream from its leading bytes (spec §4.4).
pub struct TypeDetector;

impl TypeDetector {
    /// Peeks ahead in `source` (without consuming anything — later reads,
    /// e.g. by [`crate::es_unit::EsUnitBuilder`], see the same bytes) and
    /// classifies the codec family.
    ///
    /// Checks are ordered most-specific first: H.262's sequence-header byte
    /// is exact and corroborated by a second signal, AVS's sequence-start
    /// byte is exact, and H.264's NAL-type heuristic is a masked match on
    /// small values that would also match plausible H.262 slice startcodes
    /// — so it is tried last, to avoid it winning over a stronger, more
    /// specific signal purely by trying first.
    pub fn detect<R: Read>(source: &mut ByteSource<R>) -> Result<Detection> {
        let window = source.peek(MAX_PEEK_BYTES)?;
        let ids = startcode_ids(window, MAX_STARTCODES);
        if ids.is_empty() {
            return Ok(Detection::NoEvidence);
        }

        let mut h262 = Heuristic::from(H262Heuristic::default());
        let mut avs = Heuristic::from(AvsHeuristic::default());
        let mut h264 = Heuristic::from(H264Heuristic::default());
        for &id in &ids {
            h262.observe(id);
            avs.observe(id);
            h264.observe(id);
        }

        if h262.confirmed() {
            Ok(Detection::Classified(StreamType::H262))
        } else if avs.confirmed() {
            Ok(Detection::Classified(StreamType::Avs))
        } else if h264.confirmed() {
            Ok(Detection::Classified(StreamType::H264))
        } else {
            Ok(Detection::Ambiguous)
        }
    }
}
