//! Binary buffer reader with cursor tracking and bounds checking.

use std::str;

use crate::BufferError;

/// A binary buffer reader that reads little-endian data from a byte slice.
///
/// The reader maintains a cursor position `x` and an exclusive limit `end`.
/// Every read is checked against the limit and fails with
/// [`BufferError::EndOfBuffer`] instead of panicking. Callers that decode
/// length-framed data can temporarily narrow `end` to the frame boundary so
/// that nested reads cannot escape the frame, then restore it afterwards.
///
/// # Example
///
/// ```
/// use docwire_buffers::Reader;
///
/// let data = [0x01, 0x03, 0x02];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert!(reader.u8().is_err());
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position. Never exceeds `end`.
    pub x: usize,
    /// End position (exclusive). Never exceeds `uint8.len()`.
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader over the whole byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        let end = uint8.len();
        Self { uint8, x: 0, end }
    }

    /// Returns the number of readable bytes left before the limit.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    #[inline]
    fn assert_size(&self, size: usize) -> Result<(), BufferError> {
        if size > self.end - self.x {
            return Err(BufferError::EndOfBuffer);
        }
        Ok(())
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.assert_size(1)?;
        Ok(self.uint8[self.x])
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.assert_size(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.assert_size(size)?;
        let x = self.x;
        let end = x + size;
        self.x = end;
        Ok(&self.uint8[x..end])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.assert_size(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer (little-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.assert_size(2)?;
        let x = self.x;
        let val = u16::from_le_bytes([self.uint8[x], self.uint8[x + 1]]);
        self.x = x + 2;
        Ok(val)
    }

    /// Reads a signed 16-bit integer (little-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        Ok(self.u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.assert_size(4)?;
        let x = self.x;
        let val = u32::from_le_bytes([
            self.uint8[x],
            self.uint8[x + 1],
            self.uint8[x + 2],
            self.uint8[x + 3],
        ]);
        self.x = x + 4;
        Ok(val)
    }

    /// Reads a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        Ok(self.u32()? as i32)
    }

    /// Reads an unsigned 64-bit integer (little-endian).
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.assert_size(8)?;
        let x = self.x;
        let val = u64::from_le_bytes([
            self.uint8[x],
            self.uint8[x + 1],
            self.uint8[x + 2],
            self.uint8[x + 3],
            self.uint8[x + 4],
            self.uint8[x + 5],
            self.uint8[x + 6],
            self.uint8[x + 7],
        ]);
        self.x = x + 8;
        Ok(val)
    }

    /// Reads a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        Ok(self.u64()? as i64)
    }

    /// Reads a 32-bit floating point number (little-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_bits(self.u32()?))
    }

    /// Reads a 64-bit floating point number (little-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_bits(self.u64()?))
    }

    /// Reads a UTF-8 string of the given byte size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }
}
