//! BSON wire constants.
//!
//! BSON is a little-endian binary format. Every document is framed as
//! `int32 totalLength, element*, 0x00`, where `totalLength` counts the
//! length prefix itself and the trailing null byte.

// Element tag bytes (first byte of every element).
pub const TAG_FLOAT: u8 = 0x01;
pub const TAG_STRING: u8 = 0x02;
pub const TAG_DOCUMENT: u8 = 0x03;
pub const TAG_ARRAY: u8 = 0x04;
pub const TAG_BINARY: u8 = 0x05;
pub const TAG_UNDEFINED: u8 = 0x06;
pub const TAG_OBJECT_ID: u8 = 0x07;
pub const TAG_BOOLEAN: u8 = 0x08;
pub const TAG_UTC_DATETIME: u8 = 0x09;
pub const TAG_NULL: u8 = 0x0A;
pub const TAG_REGEX: u8 = 0x0B;
pub const TAG_JAVASCRIPT: u8 = 0x0D;
pub const TAG_SYMBOL: u8 = 0x0E;
pub const TAG_JAVASCRIPT_WITH_SCOPE: u8 = 0x0F;
pub const TAG_INT32: u8 = 0x10;
pub const TAG_TIMESTAMP: u8 = 0x11;
pub const TAG_INT64: u8 = 0x12;
pub const TAG_MAX_KEY: u8 = 0x7F;
pub const TAG_MIN_KEY: u8 = 0xFF;

// Canonical IEEE 754 bit patterns for the non-finite float sentinels.
// Exactly these encodings map to the sentinel values on decode; any other
// NaN payload is carried through as a plain float.
pub const NAN_BITS: u64 = 0x7FF8_0000_0000_0000;
pub const POS_INFINITY_BITS: u64 = 0x7FF0_0000_0000_0000;
pub const NEG_INFINITY_BITS: u64 = 0xFFF0_0000_0000_0000;

/// Smallest legal document: a length prefix and the trailing null byte.
pub const MIN_DOCUMENT_SIZE: usize = 5;
