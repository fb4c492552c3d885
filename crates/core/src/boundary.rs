//! Locating the end of real content inside a single window.

use crate::padding::is_padding;

/// Length of the shortest prefix of `window` that holds every non-padding byte.
///
/// Scans from the tail, so a window that ends right after its content costs
/// one comparison. Returns 0 when the window is entirely padding.
pub fn find_boundary(window: &[u8]) -> usize {
    window
        .iter()
        .rposition(|&b| !is_padding(b))
        .map_or(0, |last| last + 1)
}

/// Head-first equivalent of [`find_boundary`].
///
/// Reads the whole window; kept as the reference the tail scan must agree with.
#[cfg(test)]
pub(crate) fn find_boundary_forward(window: &[u8]) -> usize {
    let mut boundary = 0;
    for (i, &b) in window.iter().enumerate() {
        if !is_padding(b) {
            boundary = i + 1;
        }
    }
    boundary
}
