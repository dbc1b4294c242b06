//! Bounded binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor over a byte slice that
//! never reads past its extent and that reports failures with the absolute
//! offset into the original file, even when the reader is a nested view
//! produced by [`BinaryReader::sub_reader`].

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A bounded binary reader over a byte slice.
///
/// All multi-byte reads are little-endian. A reader carries the absolute
/// file offset of its first byte so that nested views created with
/// [`sub_reader`](Self::sub_reader) produce diagnostics relative to the
/// whole file rather than the view.
///
/// # Example
///
/// ```
/// use rwclump_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// let mut child = reader.sub_reader(4).unwrap();
/// assert_eq!(child.offset(), 4);
/// assert_eq!(child.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader over a whole buffer (absolute offset 0).
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Absolute file offset of the current cursor position.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Number of bytes remaining in this view.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Capacity hint for reading `count` elements of `elem_size` bytes each.
    ///
    /// Declared counts come straight from the file; clamping them to what
    /// this bounded view could still supply keeps a hostile count from
    /// driving a huge allocation before the checked reads fail.
    #[inline]
    pub const fn clamped_capacity(&self, count: usize, elem_size: usize) -> usize {
        let possible = self.remaining() / elem_size;
        if count < possible {
            count
        } else {
            possible
        }
    }

    fn eof(&self, needed: usize) -> Error {
        Error::UnexpectedEof {
            offset: self.offset(),
            needed,
            available: self.remaining(),
        }
    }

    /// Read `count` bytes and advance the cursor.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(self.eof(count));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Advance the cursor by `count` bytes, failing if the view is shorter.
    ///
    /// Skipping is checked: a declared size that overruns the view is a
    /// truncation, not a silent saturation.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Split off a bounded child view of `len` bytes, consuming them from
    /// this reader.
    ///
    /// The child cannot read past its extent even if nested readers attempt
    /// to, and it reports absolute offsets into the original file.
    pub fn sub_reader(&mut self, len: usize) -> Result<BinaryReader<'a>> {
        let base = self.offset();
        let bytes = self.read_bytes(len)?;
        Ok(BinaryReader { data: bytes, pos: 0, base })
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    /// Read a fixed-size struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` and should use zerocopy's
    /// little-endian field types so the layout matches the file regardless
    /// of host endianness.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.offset();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }

    /// Read a string from a fixed-size buffer, stopping at the first NUL.
    ///
    /// Decoding is lossy; legacy exporters occasionally emit garbage past
    /// the terminator.
    pub fn read_string_in_buffer(&mut self, buffer_size: usize) -> Result<String> {
        let bytes = self.read_bytes(buffer_size)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(buffer_size);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}
