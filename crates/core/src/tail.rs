//! Backward scan from end-of-file with a growing window ("paranoia" mode).
//!
//! Nothing in the header is trusted. The first window covers the last
//! [`INITIAL_WINDOW`] bytes; each padded window is followed by one twice as
//! large that ends where the previous one started.

use std::io::{self, Read, Seek};

use crate::boundary::find_boundary;
use crate::image::read_window;

/// Size of the first window read before end-of-file.
pub const INITIAL_WINDOW: u64 = 4 * 1024;
/// Growth stops here so huge padding runs do not allocate huge buffers.
pub const MAX_WINDOW: u64 = 8 * 1024 * 1024;

/// Result of a tail scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailScan {
    /// Boundary offset, 0 when no content was found at or above the floor.
    pub boundary: u64,
    /// Number of windows read.
    pub windows: u32,
}

/// Scan `image` (of `len` bytes) backward, never reading below `floor`.
#[tracing::instrument(skip(image))]
pub fn scan_tail<R: Read + Seek + ?Sized>(
    image: &mut R,
    len: u64,
    floor: u64,
) -> io::Result<TailScan> {
    let mut window_end = len;
    let mut size = INITIAL_WINDOW;
    let mut windows = 0u32;

    while window_end > floor {
        let window_start = window_end.saturating_sub(size).max(floor);
        let window = read_window(image, window_start, (window_end - window_start) as usize)?;
        windows += 1;

        let local = find_boundary(&window);
        tracing::trace!(window_start, size = window.len(), local, "scanned window");
        if local > 0 {
            let boundary = window_start + local as u64;
            tracing::debug!(boundary, windows, "found last content byte");
            return Ok(TailScan { boundary, windows });
        }

        window_end = window_start;
        size = (size * 2).min(MAX_WINDOW);
    }

    tracing::debug!(windows, "no content above floor");
    Ok(TailScan { boundary: 0, windows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn image(content: usize, padding: usize) -> Cursor<Vec<u8>> {
        let mut data = vec![0x5A; content];
        data.resize(content + padding, 0xFF);
        Cursor::new(data)
    }

    fn scan(mut cursor: Cursor<Vec<u8>>, floor: u64) -> TailScan {
        let len = cursor.get_ref().len() as u64;
        scan_tail(&mut cursor, len, floor).unwrap()
    }

    #[test]
    fn content_in_first_window() {
        let result = scan(image(10_000, 1_000), 0);
        assert_eq!(result, TailScan { boundary: 10_000, windows: 1 });
    }

    #[test]
    fn window_grows_backward() {
        // 4 KiB, then 8 KiB ending at len - 4 KiB, then 16 KiB.
        let result = scan(image(100, 20 * 1024), 0);
        assert_eq!(result.boundary, 100);
        assert_eq!(result.windows, 3);
    }

    #[test]
    fn no_padding() {
        let result = scan(image(777, 0), 0);
        assert_eq!(result.boundary, 777);
    }

    #[test]
    fn short_file_reads_partial_window() {
        assert_eq!(scan(image(3, 5), 0).boundary, 3);
    }

    #[test]
    fn all_padding_is_sentinel() {
        let result = scan(image(0, 64 * 1024), 0);
        assert_eq!(result.boundary, 0);
        assert_eq!(result.windows, 5);
        assert_eq!(scan(image(0, 0), 0).boundary, 0);
    }

    #[test]
    fn stops_at_floor() {
        let result = scan(image(1_000, 50_000), 20_000);
        assert_eq!(result.boundary, 0);
    }

    #[test]
    fn content_above_floor_is_found() {
        assert_eq!(scan(image(30_000, 50_000), 20_000).boundary, 30_000);
    }

    #[test]
    fn window_size_is_capped() {
        let result = scan(image(1, 3 * MAX_WINDOW as usize), 0);
        assert_eq!(result.boundary, 1);
    }
}
