//! Per-image failure taxonomy.

use std::path::PathBuf;
use thiserror::Error;

/// Why an image was left as it was.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("cannot open {} for reading and writing", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {} while detecting padding", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no content found in {len} bytes; image left untouched")]
    DetectionFailed { len: u64 },

    #[error("failed to resize {} to {boundary} bytes", path.display())]
    Truncate {
        path: PathBuf,
        boundary: u64,
        #[source]
        source: std::io::Error,
    },
}

impl TrimError {
    /// Detection failures are reported as warnings, not errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, TrimError::DetectionFailed { .. })
    }

    /// Short machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TrimError::Open { .. } => "open",
            TrimError::Read { .. } => "read",
            TrimError::DetectionFailed { .. } => "detection_failed",
            TrimError::Truncate { .. } => "truncate",
        }
    }
}
