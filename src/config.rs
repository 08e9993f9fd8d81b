//! Pipeline configuration (ambient concern, SPEC_FULL.md §D).
//!
//! The teacher's parser has no configuration surface of its own (every
//! parse call is self-describing from the bytes it reads). The write side
//! needs one: spec §6 names the PIDs and identifiers a caller may override,
//! and spec §7 names `InvalidConfig` as a distinct failure mode validated
//! once, at a boundary, rather than checked ad hoc throughout the pipeline.

use crate::error::{ErrorDetails, Result};
use crate::type_detector::StreamType;

/// Default video elementary-stream PID (spec §3).
pub const DEFAULT_VIDEO_PID: u16 = 0x68;
/// Default PMT PID (spec §3).
pub const DEFAULT_PMT_PID: u16 = 0x66;
/// Default `transport_stream_id` for the PAT (spec §6).
pub const DEFAULT_TRANSPORT_STREAM_ID: u16 = 1;
/// Default `program_number` for the PAT/PMT (spec §6).
pub const DEFAULT_PROGRAM_NUMBER: u16 = 1;

const PAT_PID: u16 = 0x0000;
const NULL_PID: u16 = 0x1FFF;
const MAX_PID: u16 = 0x1FFF;

/// Configuration for one [`crate::pipeline::Pipeline`] run.
///
/// Mirrors the settings an external CLI layer (spec §6's flag table; out
/// of scope here) would populate and hand to the library. Field names
/// track the CLI flags they correspond to (`-pid`, `-pmt`, `-h262`/
/// `-h264`/`-avc`/`-avs`, `-max`) rather than inventing new vocabulary.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Video elementary-stream PID.
    pub video_pid: u16,
    /// PMT PID.
    pub pmt_pid: u16,
    /// Overrides auto-detection (spec §4.4) when set.
    pub forced_type: Option<StreamType>,
    /// Stop after emitting this many ES units (spec §4.8, §7
    /// `BudgetReached`), if set.
    pub max_units: Option<u64>,
    /// `transport_stream_id` written into the PAT.
    pub transport_stream_id: u16,
    /// `program_number` written into the PAT and PMT.
    pub program_number: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_pid: DEFAULT_VIDEO_PID,
            pmt_pid: DEFAULT_PMT_PID,
            forced_type: None,
            max_units: None,
            transport_stream_id: DEFAULT_TRANSPORT_STREAM_ID,
            program_number: DEFAULT_PROGRAM_NUMBER,
        }
    }
}

impl PipelineConfig {
    /// Validates the PID invariants spec §3 requires (disjoint, non-zero,
    /// outside the reserved `0x0000`/`0x1FFF` range, within 13 bits) and
    /// that `max_units`, if set, is positive (spec §7 `InvalidConfig`).
    pub fn validate(&self) -> Result<()> {
        if self.video_pid > MAX_PID {
            return Err(ErrorDetails::InvalidConfig("video_pid exceeds 13 bits"));
        }
        if self.pmt_pid > MAX_PID {
            return Err(ErrorDetails::InvalidConfig("pmt_pid exceeds 13 bits"));
        }
        if self.video_pid == PAT_PID || self.video_pid == NULL_PID {
            return Err(ErrorDetails::InvalidConfig("video_pid is a reserved PID"));
        }
        if self.pmt_pid == PAT_PID || self.pmt_pid == NULL_PID {
            return Err(ErrorDetails::InvalidConfig("pmt_pid is a reserved PID"));
        }
        if self.video_pid == self.pmt_pid {
            return Err(ErrorDetails::InvalidConfig(
                "video_pid and pmt_pid must be disjoint",
            ));
        }
        if self.max_units == Some(0) {
            return Err(ErrorDetails::InvalidConfig("max_units must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_colliding_pids() {
        let config = PipelineConfig {
            pmt_pid: DEFAULT_VIDEO_PID,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ErrorDetails::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_reserved_pat_pid() {
        let config = PipelineConfig {
            video_pid: 0x0000,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_reserved_null_pid() {
        let config = PipelineConfig {
            pmt_pid: 0x1FFF,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_units() {
        let config = PipelineConfig {
            max_units: Some(0),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_pid() {
        let config = PipelineConfig {
            video_pid: 0x2000,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
