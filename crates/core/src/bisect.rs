//! Chunked binary search for the first wholly padded chunk.
//!
//! The image is treated as `ceil(len / CHUNK_SIZE)` chunks. Only
//! `O(log chunks)` chunks are probed before the final boundary scan.
//!
//! The search assumes the trailing padding is one contiguous run; this is not
//! verified. When it does not hold, the probes can settle on an earlier padded
//! run. The final scan still covers everything up to end-of-file, but an image
//! whose probes all land in padding reports the 0 sentinel even though content
//! exists further on.

use std::io::{self, Read, Seek};

use crate::boundary::find_boundary;
use crate::image::read_window;
use crate::padding::is_all_padding;

/// Width of one probe.
pub const CHUNK_SIZE: u64 = 32 * 1024;

/// Result of a bisection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bisection {
    /// Boundary offset, 0 when the image is entirely padding.
    pub boundary: u64,
    /// Number of chunks probed during the search phase.
    pub probes: u32,
}

/// Number of chunks an image of `len` bytes is split into.
pub fn chunk_count(len: u64) -> u64 {
    len.div_ceil(CHUNK_SIZE)
}

/// Binary-search `image` (of `len` bytes) for the end of its content.
#[tracing::instrument(skip(image), fields(chunks = chunk_count(len)))]
pub fn bisect<R: Read + Seek + ?Sized>(image: &mut R, len: u64) -> io::Result<Bisection> {
    let mut begin = 0u64;
    let mut end = chunk_count(len);
    let mut probes = 0u32;

    while begin < end {
        // Floor division picks the lower middle.
        let mid = begin + (end - begin) / 2;
        let chunk = read_chunk(image, mid, len)?;
        probes += 1;

        if is_all_padding(&chunk) {
            end = mid;
        } else {
            begin = mid + 1;
        }
        tracing::trace!(mid, begin, end, "probed chunk");
    }

    if begin == 0 {
        tracing::debug!(probes, "every chunk is padding");
        return Ok(Bisection { boundary: 0, probes });
    }

    let region_start = (begin - 1) * CHUNK_SIZE;
    let boundary = scan_region(image, region_start, len)?;
    tracing::debug!(probes, first_padded_chunk = begin, boundary, "bisection finished");
    Ok(Bisection { boundary, probes })
}

fn read_chunk<R: Read + Seek + ?Sized>(image: &mut R, chunk: u64, len: u64) -> io::Result<Vec<u8>> {
    let start = chunk * CHUNK_SIZE;
    let width = CHUNK_SIZE.min(len - start);
    read_window(image, start, width as usize)
}

/// Boundary of `[start, end)`, read tail-first one chunk at a time.
fn scan_region<R: Read + Seek + ?Sized>(image: &mut R, start: u64, end: u64) -> io::Result<u64> {
    let mut window_end = end;
    while window_end > start {
        let window_start = window_end.saturating_sub(CHUNK_SIZE).max(start);
        let window = read_window(image, window_start, (window_end - window_start) as usize)?;
        let local = find_boundary(&window);
        if local > 0 {
            return Ok(window_start + local as u64);
        }
        window_end = window_start;
    }
    Ok(0)
}
