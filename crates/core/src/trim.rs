//! Strategy selection, reconciliation of header and scan results, truncation.

use std::fs::OpenOptions;
use std::io::{self, Read, Seek};
use std::path::Path;

use crate::bisect::bisect;
use crate::error::TrimError;
use crate::header::probe_header;
use crate::image::RomImage;
use crate::tail::scan_tail;
use crate::types::{Detection, ScanEngine, ScanResult, Strategy, TrimConfig, TrimOutcome};

/// Raise `scanned` to `header` when the scan stopped short of it.
///
/// Returns the reconciled boundary and whether it was raised.
pub fn clamp_to_header(scanned: u64, header: u64) -> (u64, bool) {
    if scanned < header {
        (header, true)
    } else {
        (scanned, false)
    }
}

fn run_scan<R: Read + Seek + ?Sized>(
    image: &mut R,
    len: u64,
    engine: ScanEngine,
) -> io::Result<ScanResult> {
    match engine {
        ScanEngine::Tail => {
            let scan = scan_tail(image, len, 0)?;
            Ok(ScanResult {
                engine,
                boundary: scan.boundary,
                reads: scan.windows,
            })
        }
        ScanEngine::Bisect => {
            let bisection = bisect(image, len)?;
            Ok(ScanResult {
                engine,
                boundary: bisection.boundary,
                reads: bisection.probes,
            })
        }
    }
}

/// Work out where the content of `image` (of `len` bytes) ends.
///
/// Never writes. A boundary of 0 in the result means detection failed.
#[tracing::instrument(skip(image, config), fields(strategy = ?config.strategy()))]
pub fn detect_boundary<R: Read + Seek + ?Sized>(
    image: &mut R,
    len: u64,
    config: &TrimConfig,
) -> io::Result<Detection> {
    let strategy = config.strategy();
    let header = match strategy {
        Strategy::ScanOnly => None,
        Strategy::HeaderOnly | Strategy::HeaderWithScanFallback => {
            Some(probe_header(image, len, config.header_field_offset)?)
        }
    };
    let trusted = header.and_then(|probe| probe.trusted());

    let mut detection = Detection {
        strategy,
        header,
        scan: None,
        clamped: false,
        boundary: 0,
    };

    match (strategy, trusted) {
        (Strategy::HeaderOnly, Some(offset)) => {
            detection.boundary = offset.boundary();
        }
        (Strategy::HeaderWithScanFallback, Some(offset)) if offset.boundary() == len => {
            tracing::debug!("header matches file size, nothing to scan");
            detection.boundary = len;
        }
        (Strategy::HeaderWithScanFallback, Some(offset)) => {
            let scan = run_scan(image, len, config.scan_engine)?;
            let (boundary, clamped) = clamp_to_header(scan.boundary, offset.boundary());
            if clamped {
                tracing::info!(
                    scanned = scan.boundary,
                    header = offset.boundary(),
                    "header suggests the image is larger than the scan found"
                );
            }
            detection.scan = Some(scan);
            detection.clamped = clamped;
            detection.boundary = boundary;
        }
        (_, _) => {
            if header.is_some() {
                tracing::debug!(?header, "header unusable, falling back to scan");
            }
            let scan = run_scan(image, len, config.scan_engine)?;
            detection.scan = Some(scan);
            detection.boundary = scan.boundary;
        }
    }

    Ok(detection)
}

/// Detect the padding of `image` and cut it off.
///
/// `path` names the image in errors. The image is not resized when detection
/// fails or when nothing needs to go.
pub fn trim_image<R: RomImage + ?Sized>(
    image: &mut R,
    path: &Path,
    config: &TrimConfig,
) -> Result<TrimOutcome, TrimError> {
    let read_error = |source| TrimError::Read {
        path: path.to_path_buf(),
        source,
    };
    let original_len = image.byte_len().map_err(read_error)?;
    let detection = detect_boundary(image, original_len, config).map_err(read_error)?;
    let boundary = detection.boundary;

    if boundary == 0 {
        tracing::warn!(len = original_len, "no content found, refusing to trim");
        return Err(TrimError::DetectionFailed { len: original_len });
    }
    debug_assert!(boundary <= original_len);

    if boundary != original_len {
        image
            .set_byte_len(boundary)
            .map_err(|source| TrimError::Truncate {
                path: path.to_path_buf(),
                boundary,
                source,
            })?;
        tracing::debug!(from = original_len, to = boundary, "resized image");
    }

    Ok(TrimOutcome {
        original_len,
        new_len: boundary,
        detection,
    })
}

/// Open `path` read+write and trim it in place.
#[tracing::instrument(skip(config), fields(path = %path.display()))]
pub fn trim_file(path: &Path, config: &TrimConfig) -> Result<TrimOutcome, TrimError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| TrimError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    trim_image(&mut file, path, config)
}
