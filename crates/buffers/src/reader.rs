//! Bounds-checked binary reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary buffer reader over a byte slice.
///
/// The reader keeps a cursor and exposes big-endian reads for the integer and
/// float widths BeeSon uses. Reads past the end leave the cursor untouched
/// and return [`BufferError::EndOfBuffer`].
///
/// # Example
///
/// ```
/// use beeson_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert_eq!(reader.size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Creates a reader whose cursor starts at `x`.
    pub fn at(uint8: &'a [u8], x: usize) -> Self {
        Self { uint8, x }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.buf(length).map(|_| ())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let end = self.x.checked_add(size).ok_or(BufferError::EndOfBuffer)?;
        let bin = self
            .uint8
            .get(self.x..end)
            .ok_or(BufferError::EndOfBuffer)?;
        self.x = end;
        Ok(bin)
    }

    /// Returns everything after the cursor and moves the cursor to the end.
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.x.min(self.uint8.len());
        self.x = self.uint8.len();
        &self.uint8[start..]
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let bin = self.buf(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bin);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.fixed::<1>().map(|b| b[0])
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        self.fixed::<1>().map(i8::from_be_bytes)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.fixed().map(u16::from_be_bytes)
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        self.fixed().map(i16::from_be_bytes)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.fixed().map(u32::from_be_bytes)
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        self.fixed().map(i32::from_be_bytes)
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        self.fixed().map(i64::from_be_bytes)
    }

    /// Reads a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.fixed().map(f32::from_be_bytes)
    }

    /// Reads a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.fixed().map(f64::from_be_bytes)
    }

    /// Reads exactly 32 bytes.
    pub fn bytes32(&mut self) -> Result<[u8; 32], BufferError> {
        self.fixed()
    }

    /// Reads a UTF-8 string of the given byte size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bin = self.buf(size)?;
        str::from_utf8(bin).map_err(|_| BufferError::InvalidUtf8)
    }
}
