//! CLI utility functions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const ROM_EXTENSION: &str = "nds";

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const KB_TO_MB_ROUNDING_THRESHOLD: u64 = 1_048_525;

    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < KB_TO_MB_ROUNDING_THRESHOLD {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{:.2} MB", bytes as f64 / MB)
    }
}

/// Accepts decimal (`128`) or hexadecimal (`0x80`) byte offsets.
pub fn parse_offset(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte offset '{s}': {e}"))
}

pub fn has_rom_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ROM_EXTENSION))
}

/// Existing files among `paths`, deduplicated, in first-seen order.
///
/// Anything else is dropped without an error.
pub fn collect_candidates(paths: &[PathBuf], ignore_extension: bool) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for path in paths {
        if !ignore_extension && !has_rom_extension(path) {
            tracing::debug!(path = %path.display(), "skipping file without .nds extension");
            continue;
        }
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "skipping missing file");
            continue;
        }
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            candidates.push(path.clone());
        } else {
            tracing::debug!(path = %path.display(), "skipping duplicate");
        }
    }

    candidates
}
