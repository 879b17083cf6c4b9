//! Binary buffer writer with auto-growing storage.

/// A binary buffer writer that appends data to an auto-growing buffer.
///
/// The buffer is pre-allocated and written through direct indexing, so the
/// cursor `x` always trails the allocated length. Callers that reserve space
/// and patch it later (length prefixes and similar) can manipulate `x` and
/// `uint8` directly after calling [`Writer::ensure_capacity`].
///
/// # Example
///
/// ```
/// use docwire_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// let data = writer.flush();
/// assert_eq!(data, vec![0x01, 0x03, 0x02]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Current cursor position.
    pub x: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default allocation size.
    pub fn new() -> Self {
        Self::with_alloc_size(4 * 1024)
    }

    /// Creates a new writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0; alloc_size],
            x: 0,
        }
    }

    /// Resets the cursor to the start of the buffer.
    pub fn reset(&mut self) {
        self.x = 0;
    }

    /// Returns the number of bytes written since the last reset or flush.
    pub fn size(&self) -> usize {
        self.x
    }

    /// Grows the buffer so that at least `capacity` more bytes fit.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let required = self.x + capacity;
        if required > self.uint8.len() {
            let grown = (self.uint8.len() * 2).max(required);
            self.uint8.resize(grown, 0);
        }
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = value;
        self.x += 1;
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, value: i8) {
        self.u8(value as u8);
    }

    /// Writes an unsigned 16-bit integer (little-endian).
    #[inline]
    pub fn u16(&mut self, value: u16) {
        self.ensure_capacity(2);
        self.uint8[self.x..self.x + 2].copy_from_slice(&value.to_le_bytes());
        self.x += 2;
    }

    /// Writes a signed 16-bit integer (little-endian).
    #[inline]
    pub fn i16(&mut self, value: i16) {
        self.u16(value as u16);
    }

    /// Writes an unsigned 32-bit integer (little-endian).
    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.ensure_capacity(4);
        self.uint8[self.x..self.x + 4].copy_from_slice(&value.to_le_bytes());
        self.x += 4;
    }

    /// Writes a signed 32-bit integer (little-endian).
    #[inline]
    pub fn i32(&mut self, value: i32) {
        self.u32(value as u32);
    }

    /// Writes an unsigned 64-bit integer (little-endian).
    #[inline]
    pub fn u64(&mut self, value: u64) {
        self.ensure_capacity(8);
        self.uint8[self.x..self.x + 8].copy_from_slice(&value.to_le_bytes());
        self.x += 8;
    }

    /// Writes a signed 64-bit integer (little-endian).
    #[inline]
    pub fn i64(&mut self, value: i64) {
        self.u64(value as u64);
    }

    /// Writes a 32-bit floating point number (little-endian).
    #[inline]
    pub fn f32(&mut self, value: f32) {
        self.u32(value.to_bits());
    }

    /// Writes a 64-bit floating point number (little-endian).
    #[inline]
    pub fn f64(&mut self, value: f64) {
        self.u64(value.to_bits());
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, data: &[u8]) {
        self.ensure_capacity(data.len());
        self.uint8[self.x..self.x + data.len()].copy_from_slice(data);
        self.x += data.len();
    }

    /// Writes the UTF-8 bytes of a string.
    pub fn utf8(&mut self, value: &str) {
        self.buf(value.as_bytes());
    }

    /// Returns the written bytes and resets the cursor.
    pub fn flush(&mut self) -> Vec<u8> {
        let out = self.uint8[..self.x].to_vec();
        self.x = 0;
        out
    }
}
