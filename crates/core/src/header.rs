//! Header end-of-content field ("application end offset") and its verification.
//!
//! Nintendo DS headers store the size of the meaningful part of the image as a
//! little-endian `u32` at 0x80. Some dumps declare slightly less than what is
//! really there, so the bytes following the declared offset are checked too.
//!
//! Only offsets past end-of-file are rejected. A declared offset of 0, or one
//! that points inside the header itself, is trusted like any other: the
//! verification window then decides the boundary, and an image with content
//! beyond that window is cut to at most `declared + VERIFY_WINDOW` bytes.
//! Paranoid mode scans from end-of-file and keeps everything the scan finds.

use serde::Serialize;
use std::io::{self, Read, Seek};

use crate::boundary::find_boundary;
use crate::image::read_window;

/// Position of the application end offset in a DS header.
pub const APPLICATION_END_OFFSET_FIELD: u64 = 0x80;
/// Bytes inspected after the declared offset.
pub const VERIFY_WINDOW: u64 = 4 * 1024;
/// Discrepancy typically seen on wi-fi enabled titles, whose RSA block follows
/// the declared end.
pub const WIFI_DISCREPANCY: u64 = 136;

const FIELD_LEN: u64 = 4;

/// A declared offset that survived verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderOffset {
    /// Value stored in the header.
    pub declared: u64,
    /// Content found past `declared` within the verification window.
    pub discrepancy: u64,
}

impl HeaderOffset {
    /// Corrected boundary: declared offset plus discrepancy.
    pub fn boundary(&self) -> u64 {
        self.declared + self.discrepancy
    }

    pub fn is_exact(&self) -> bool {
        self.discrepancy == 0
    }

    /// The discrepancy matches the one left by wi-fi enabled titles.
    pub fn looks_like_wifi_title(&self) -> bool {
        self.discrepancy == WIFI_DISCREPANCY
    }
}

/// Outcome of reading the header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeaderProbe {
    Trusted(HeaderOffset),
    /// The image ends before the field does.
    MissingField { len: u64 },
    /// The declared offset points past end-of-file.
    BeyondEof { declared: u64, len: u64 },
}

impl HeaderProbe {
    pub fn trusted(&self) -> Option<HeaderOffset> {
        match self {
            HeaderProbe::Trusted(offset) => Some(*offset),
            _ => None,
        }
    }
}

/// Read the raw little-endian field at `field_offset`, if the image holds it.
pub fn read_declared_end<R: Read + Seek + ?Sized>(
    image: &mut R,
    len: u64,
    field_offset: u64,
) -> io::Result<Option<u64>> {
    if field_offset.saturating_add(FIELD_LEN) > len {
        return Ok(None);
    }
    let raw = read_window(image, field_offset, FIELD_LEN as usize)?;
    let field = [raw[0], raw[1], raw[2], raw[3]];
    Ok(Some(u64::from(u32::from_le_bytes(field))))
}

/// Read the header field and verify it against the bytes that follow it.
#[tracing::instrument(skip(image))]
pub fn probe_header<R: Read + Seek + ?Sized>(
    image: &mut R,
    len: u64,
    field_offset: u64,
) -> io::Result<HeaderProbe> {
    let Some(declared) = read_declared_end(image, len, field_offset)? else {
        tracing::debug!("image too short to hold the header field");
        return Ok(HeaderProbe::MissingField { len });
    };

    if declared > len {
        tracing::debug!(declared, "declared offset is beyond end-of-file");
        return Ok(HeaderProbe::BeyondEof { declared, len });
    }

    let width = VERIFY_WINDOW.min(len - declared);
    let window = read_window(image, declared, width as usize)?;
    let offset = HeaderOffset {
        declared,
        discrepancy: find_boundary(&window) as u64,
    };

    if offset.is_exact() {
        tracing::debug!(declared, "declared offset is exact");
    } else {
        tracing::info!(
            declared,
            discrepancy = offset.discrepancy,
            corrected = offset.boundary(),
            "declared offset is short"
        );
    }
    Ok(HeaderProbe::Trusted(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Image with the field at `field_offset` holding `declared`, content up
    /// to `content_end` and 0xFF padding up to `len`.
    fn image(len: usize, field_offset: usize, declared: u32, content_end: usize) -> Cursor<Vec<u8>> {
        let mut data = vec![0x33; content_end];
        data.resize(len, 0xFF);
        data[field_offset..field_offset + 4].copy_from_slice(&declared.to_le_bytes());
        Cursor::new(data)
    }

    fn probe(mut cursor: Cursor<Vec<u8>>, field_offset: u64) -> HeaderProbe {
        let len = cursor.get_ref().len() as u64;
        probe_header(&mut cursor, len, field_offset).unwrap()
    }

    #[test]
    fn reads_little_endian_field() {
        let mut cursor = image(0x200, 0x80, 0x0001_0203, 0x200);
        let declared = read_declared_end(&mut cursor, 0x200, 0x80).unwrap();
        assert_eq!(declared, Some(0x0001_0203));
    }

    #[test]
    fn exact_declared_offset() {
        let result = probe(image(0x400, 0x80, 0x300, 0x300), 0x80);
        let offset = result.trusted().unwrap();
        assert!(offset.is_exact());
        assert_eq!(offset.boundary(), 0x300);
    }

    #[test]
    fn short_declared_offset_is_corrected() {
        // 100-byte image, field at 0 says 60, content runs to 64.
        let result = probe(image(100, 0, 60, 64), 0);
        let offset = result.trusted().unwrap();
        assert_eq!(offset.discrepancy, 4);
        assert_eq!(offset.boundary(), 64);
        assert!(!offset.looks_like_wifi_title());
    }

    #[test]
    fn wifi_discrepancy_is_flagged() {
        let declared = 0x1000;
        let result = probe(image(0x2000, 0x80, declared, declared as usize + 136), 0x80);
        let offset = result.trusted().unwrap();
        assert!(offset.looks_like_wifi_title());
        assert_eq!(offset.boundary(), u64::from(declared) + 136);
    }

    #[test]
    fn declared_at_eof_needs_no_window() {
        let result = probe(image(0x200, 0x80, 0x200, 0x200), 0x80);
        assert_eq!(result.trusted().unwrap().boundary(), 0x200);
    }

    #[test]
    fn declared_beyond_eof_is_untrusted() {
        let result = probe(image(0x200, 0x80, 0x201, 0x100), 0x80);
        assert_eq!(result, HeaderProbe::BeyondEof { declared: 0x201, len: 0x200 });
        assert!(result.trusted().is_none());
    }

    #[test]
    fn all_ones_field_is_untrusted() {
        let result = probe(Cursor::new(vec![0xFF; 0x1000]), 0x80);
        assert!(matches!(result, HeaderProbe::BeyondEof { declared: 0xFFFF_FFFF, .. }));
    }

    #[test]
    fn too_short_for_field() {
        let result = probe(Cursor::new(vec![0x33; 0x82]), 0x80);
        assert_eq!(result, HeaderProbe::MissingField { len: 0x82 });
    }

    #[test]
    fn zero_offset_is_trusted_and_caps_at_one_window() {
        let result = probe(image(0x20000, 0x80, 0, 0x20000), 0x80);
        let offset = result.trusted().unwrap();
        assert_eq!(offset.declared, 0);
        assert_eq!(offset.boundary(), VERIFY_WINDOW);
    }
}
