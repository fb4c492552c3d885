//! Byte-addressable, truncatable handle abstraction used by every scanner.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A seekable image that can report and change its length.
///
/// Implemented for files opened read+write and for in-memory cursors.
pub trait RomImage: Read + Seek {
    /// Current length of the image in bytes.
    fn byte_len(&mut self) -> io::Result<u64>;

    /// Resize the image to exactly `len` bytes.
    fn set_byte_len(&mut self, len: u64) -> io::Result<()>;
}

impl RomImage for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl RomImage for Cursor<Vec<u8>> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds usize"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// Read exactly `len` bytes starting at `offset`.
///
/// Callers clamp `len` against the image length first; a short read is an error.
pub fn read_window<R: Read + Seek + ?Sized>(
    reader: &mut R,
    offset: u64,
    len: usize,
) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut window = vec![0u8; len];
    reader.read_exact(&mut window)?;
    Ok(window)
}
