//! BSON value model.
//!
//! Documents are ordered field lists, not maps: field order is significant
//! on the wire and round-trips losslessly, including duplicate keys.

/// An ordered BSON document body.
pub type BsonDocument = Vec<(String, BsonValue)>;

/// A BSON value.
///
/// The non-finite floats NaN, +Infinity and -Infinity are modeled as
/// dedicated variants rather than `f64` payloads so that decoded documents
/// compare equal to themselves. They encode to one canonical bit pattern
/// each, and only those exact patterns decode back into the variants.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// 64-bit IEEE 754 float (tag 0x01). Always finite with a
    /// non-canonical-NaN exception: payloads other than the canonical
    /// patterns stay plain floats.
    Float(f64),
    /// The canonical quiet NaN (tag 0x01, bits `0x7FF8000000000000`).
    NaN,
    /// Positive infinity (tag 0x01, bits `0x7FF0000000000000`).
    PosInfinity,
    /// Negative infinity (tag 0x01, bits `0xFFF0000000000000`).
    NegInfinity,
    /// UTF-8 string (tag 0x02).
    Str(String),
    /// Embedded document (tag 0x03).
    Document(BsonDocument),
    /// Array (tag 0x04). Encoded as a document with decimal index keys.
    Array(Vec<BsonValue>),
    /// Binary blob with subtype (tag 0x05).
    Binary(BsonBinary),
    /// 12-byte object identifier (tag 0x07). The payload is opaque.
    ObjectId(BsonObjectId),
    /// Boolean (tag 0x08).
    Boolean(bool),
    /// UTC datetime as milliseconds since the Unix epoch (tag 0x09).
    DateTime(i64),
    /// Null (tag 0x0A). Also produced for the deprecated Undefined (0x06).
    Null,
    /// Regular expression as pattern and options cstrings (tag 0x0B).
    /// Options are written in the order given; callers that need the
    /// conventional sorted form sort before constructing the value.
    Regex(String, String),
    /// JavaScript code (tag 0x0D).
    JavaScriptCode(BsonJavascriptCode),
    /// Symbol (tag 0x0E, deprecated but round-tripped).
    Symbol(BsonSymbol),
    /// JavaScript code with a scope document (tag 0x0F).
    JavaScriptCodeWithScope(BsonJavascriptCodeWithScope),
    /// 32-bit integer (tag 0x10).
    Int32(i32),
    /// Replication timestamp (tag 0x11).
    Timestamp(BsonTimestamp),
    /// 64-bit integer (tag 0x12).
    Int64(i64),
    /// Smallest key in sort order (tag 0xFF).
    MinKey,
    /// Largest key in sort order (tag 0x7F).
    MaxKey,
}

/// Binary subtype byte (tag 0x05 payload kind).
///
/// Conversion to and from the wire byte is exact in both directions, so
/// unknown and reserved subtypes survive a decode/encode round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySubtype {
    /// 0x00, the default.
    Generic,
    /// 0x01.
    Function,
    /// 0x02, old-style binary with an inner length prefix. The inner
    /// framing is not interpreted; the payload is carried opaquely.
    BinaryOld,
    /// 0x03, old-style UUID.
    UuidOld,
    /// 0x04.
    Uuid,
    /// 0x05.
    Md5,
    /// 0x80..=0xFF, user-defined subtypes. Carries the raw byte.
    UserDefined(u8),
    /// 0x06..=0x7F, reserved by the format. Carries the raw byte.
    Reserved(u8),
}

impl From<u8> for BinarySubtype {
    fn from(value: u8) -> Self {
        match value {
            0x00 => BinarySubtype::Generic,
            0x01 => BinarySubtype::Function,
            0x02 => BinarySubtype::BinaryOld,
            0x03 => BinarySubtype::UuidOld,
            0x04 => BinarySubtype::Uuid,
            0x05 => BinarySubtype::Md5,
            0x80..=0xFF => BinarySubtype::UserDefined(value),
            _ => BinarySubtype::Reserved(value),
        }
    }
}

impl From<BinarySubtype> for u8 {
    fn from(value: BinarySubtype) -> Self {
        match value {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::UserDefined(byte) => byte,
            BinarySubtype::Reserved(byte) => byte,
        }
    }
}

/// Binary blob payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonBinary {
    pub subtype: BinarySubtype,
    pub data: Vec<u8>,
}

/// 12-byte object identifier payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonObjectId {
    pub bytes: [u8; 12],
}

/// JavaScript code payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonJavascriptCode {
    pub code: String,
}

/// Symbol payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonSymbol {
    pub symbol: String,
}

/// JavaScript code with scope payload.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptCodeWithScope {
    pub code: String,
    pub scope: BsonDocument,
}

/// Replication timestamp payload. On the wire the increment is written
/// first, then the seconds value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonTimestamp {
    pub increment: i32,
    pub timestamp: i32,
}

impl From<i32> for BsonValue {
    fn from(value: i32) -> Self {
        BsonValue::Int32(value)
    }
}

impl From<i64> for BsonValue {
    /// Picks the narrowest integer representation: values inside the
    /// signed 32-bit range become [`BsonValue::Int32`].
    fn from(value: i64) -> Self {
        if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            BsonValue::Int32(value as i32)
        } else {
            BsonValue::Int64(value)
        }
    }
}

impl From<f64> for BsonValue {
    /// Normalizes non-finite floats into the sentinel variants.
    fn from(value: f64) -> Self {
        if value.is_nan() {
            BsonValue::NaN
        } else if value == f64::INFINITY {
            BsonValue::PosInfinity
        } else if value == f64::NEG_INFINITY {
            BsonValue::NegInfinity
        } else {
            BsonValue::Float(value)
        }
    }
}

impl From<bool> for BsonValue {
    fn from(value: bool) -> Self {
        BsonValue::Boolean(value)
    }
}

impl From<&str> for BsonValue {
    fn from(value: &str) -> Self {
        BsonValue::Str(value.to_owned())
    }
}

impl From<String> for BsonValue {
    fn from(value: String) -> Self {
        BsonValue::Str(value)
    }
}

impl From<Vec<BsonValue>> for BsonValue {
    fn from(value: Vec<BsonValue>) -> Self {
        BsonValue::Array(value)
    }
}

impl From<BsonDocument> for BsonValue {
    fn from(value: BsonDocument) -> Self {
        BsonValue::Document(value)
    }
}
