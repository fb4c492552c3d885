//! Padding byte classification.

/// Filler used by blank cartridge regions after erasure.
pub const FILL_ZEROES: u8 = 0x00;
/// Filler used by mask ROM dumps.
pub const FILL_ONES: u8 = 0xFF;

/// Whether `byte` is one of the two filler bit patterns.
#[inline]
pub fn is_padding(byte: u8) -> bool {
    byte == FILL_ZEROES || byte == FILL_ONES
}

/// Whether every byte of `window` is padding. An empty window is all padding.
pub fn is_all_padding(window: &[u8]) -> bool {
    window.iter().all(|&b| is_padding(b))
}
