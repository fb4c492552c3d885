//! Padding detection and trimming for cartridge ROM images.
//!
//! Untrimmed images are padded to a power-of-two size with `0x00` or `0xFF`.
//! This crate finds where the real content ends, using the header's end
//! offset when it can be trusted and scanning the image when it cannot, and
//! truncates the image there. It has no CLI or UI dependencies.

pub mod bisect;
pub mod boundary;
pub mod error;
pub mod header;
pub mod image;
pub mod padding;
pub mod tail;
pub mod trim;
pub mod types;

pub use bisect::{Bisection, CHUNK_SIZE, bisect};
pub use boundary::find_boundary;
pub use error::TrimError;
pub use header::{HeaderOffset, HeaderProbe, probe_header};
pub use image::RomImage;
pub use padding::{is_all_padding, is_padding};
pub use tail::{TailScan, scan_tail};
pub use trim::{detect_boundary, trim_file, trim_image};
pub use types::*;
