//! Run configuration and per-image result structures.

use serde::Serialize;

use crate::header::{APPLICATION_END_OFFSET_FIELD, HeaderProbe};

/// Scanner used whenever the header alone does not settle the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEngine {
    /// Backward scan with a growing window.
    #[default]
    Tail,
    /// Chunked binary search.
    Bisect,
}

/// How the boundary is detected. Derived from [`TrimConfig`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Trust the verified header offset; scan only if the header is unusable.
    HeaderOnly,
    /// Verify the header, and scan whenever it disagrees with the file size.
    /// The header offset stays a lower bound.
    HeaderWithScanFallback,
    /// Ignore the header entirely and scan.
    ScanOnly,
}

/// Switches decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimConfig {
    pub paranoid: bool,
    /// Skip the header field; implies `paranoid`.
    pub ignore_header: bool,
    pub scan_engine: ScanEngine,
    /// Byte position of the end-of-content field.
    pub header_field_offset: u64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            paranoid: false,
            ignore_header: false,
            scan_engine: ScanEngine::default(),
            header_field_offset: APPLICATION_END_OFFSET_FIELD,
        }
    }
}

impl TrimConfig {
    pub fn strategy(&self) -> Strategy {
        if self.ignore_header {
            Strategy::ScanOnly
        } else if self.paranoid {
            Strategy::HeaderWithScanFallback
        } else {
            Strategy::HeaderOnly
        }
    }
}

/// Result of one scanner run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub engine: ScanEngine,
    pub boundary: u64,
    /// Windows (tail) or chunk probes (bisect) read.
    pub reads: u32,
}

/// Everything the detection phase learned about an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub strategy: Strategy,
    pub header: Option<HeaderProbe>,
    pub scan: Option<ScanResult>,
    /// The scan result was raised to the header offset.
    pub clamped: bool,
    /// Final boundary; 0 means detection failed.
    pub boundary: u64,
}

/// Result of a successful trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimOutcome {
    pub original_len: u64,
    pub new_len: u64,
    pub detection: Detection,
}

impl TrimOutcome {
    /// `new_len - original_len`; never positive.
    pub fn difference(&self) -> i64 {
        self.new_len as i64 - self.original_len as i64
    }

    pub fn changed(&self) -> bool {
        self.new_len != self.original_len
    }
}
