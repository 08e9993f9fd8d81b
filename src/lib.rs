//! Packetizes a raw H.262/H.264/AVS elementary stream into a single-program
//! MPEG-2 Transport Stream (ITU-T H.222.0 / ISO/IEC 13818-1).
//!
//! This is the mirror-image write side of `mpegts-io`, the MPEG-TS
//! *parsing* library this crate started from: the same bitfield layouts
//! (`modular_bitfield_msb`), the same CRC crate, and the same error/Result
//! shape, generalized from "parse a byte slice into a struct" to
//! "serialize a struct into a byte slice". See DESIGN.md for the
//! module-by-module grounding.
//!
//! # Usage
//! ```toml
//! [dependencies]
//! es2ts = "~0.1.0"
//! ```
//!
//! ```no_run
//! use es2ts::byte_source::ByteSource;
//! use es2ts::config::PipelineConfig;
//! use es2ts::logger::LogCrateLogger;
//! use es2ts::pipeline::Pipeline;
//! use std::fs::File;
//!
//! let input = File::open("in.264").expect("unable to open input");
//! let mut output = File::create("out.ts").expect("unable to create output");
//!
//! let logger = LogCrateLogger;
//! let pipeline = Pipeline::new(PipelineConfig::default(), &logger).expect("invalid config");
//! let summary = pipeline
//!     .run(ByteSource::new(input), &mut output, true)
//!     .expect("conversion failed");
//! println!("wrote {} ES unit(s) as {:?}", summary.units_written, summary.stream_type);
//! ```

#![deny(missing_docs, unsafe_code, warnings)]

/// Component C1: buffered, forward-only reader with lookahead (spec §4.1).
pub mod byte_source;
/// Pipeline configuration (ambient, SPEC_FULL.md §D).
pub mod config;
/// Error taxonomy (spec §7).
pub mod error;
/// Component C3: groups startcode-delimited bytes into whole ES units
/// (spec §4.3).
pub mod es_unit;
/// Explicit logging seam (ambient, REDESIGN FLAG, spec §9).
pub mod logger;
/// Component C5: wraps one ES unit in a PES packet (spec §4.5).
pub mod pes;
/// Component C8: orchestrates the whole conversion (spec §4.8).
pub mod pipeline;
/// Component C7: builds PAT/PMT sections (spec §4.7).
pub mod psi;
/// Component C2: finds startcode prefixes (spec §4.2).
pub mod startcode;
/// Component C6: fragments PES/PSI payloads into 188-byte TS packets
/// (spec §4.6).
pub mod ts;
/// Component C4: classifies the ES codec family (spec §4.4).
pub mod type_detector;

pub use config::PipelineConfig;
pub use error::{ErrorDetails, Next, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use type_detector::StreamType;
