//! BSON document decoder.
//!
//! Recursive descent over the wire bytes. Every nested document, array,
//! and code-with-scope block narrows the reader's `end` limit to its own
//! declared length before descending, so a corrupt inner length can never
//! pull bytes from outside its enclosing level.
//!
//! Failures abort the decode but keep everything read so far: the error
//! carries the path down to the failing element and a per-level snapshot
//! of the fields and items decoded before the failure.

use docwire_buffers::{BufferError, Reader};

use crate::constants::*;
use crate::error::{DecodeError, DecodeErrorReason, PartialLevel, PathSegment};
use crate::values::{
    BinarySubtype, BsonBinary, BsonDocument, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonObjectId, BsonSymbol, BsonTimestamp, BsonValue,
};

/// Decode-time materialization hooks.
///
/// The hooks decide what host value a decoded document or binary element
/// becomes, without the decoder knowing about the host representation.
/// The defaults build [`BsonValue::Document`] and [`BsonValue::Binary`].
#[derive(Clone, Copy)]
pub struct DecodeOptions {
    /// Builds the value for a top-level or embedded document from its
    /// decoded fields, in wire order.
    pub build_document: fn(BsonDocument) -> BsonValue,
    /// Builds the value for a binary element from its subtype and payload.
    pub build_binary: fn(BinarySubtype, Vec<u8>) -> BsonValue,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            build_document: BsonValue::Document,
            build_binary: build_binary_value,
        }
    }
}

fn build_binary_value(subtype: BinarySubtype, data: Vec<u8>) -> BsonValue {
    BsonValue::Binary(BsonBinary { subtype, data })
}

/// BSON document decoder.
pub struct BsonDecoder {
    pub options: DecodeOptions,
}

impl Default for BsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self {
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decodes a single top-level document.
    ///
    /// The input must contain exactly one document; leftover bytes after
    /// it fail with [`DecodeErrorReason::TrailingData`], with the fully
    /// decoded document attached as the outermost partial level.
    pub fn decode(&self, data: &[u8]) -> Result<BsonValue, DecodeError> {
        let mut reader = Reader::new(data);
        let fields = self.read_document(&mut reader)?;
        if reader.x != data.len() {
            return Err(DecodeError::new(DecodeErrorReason::TrailingData)
                .with_level(PartialLevel::Document(fields)));
        }
        Ok((self.options.build_document)(fields))
    }

    fn read_document(&self, r: &mut Reader) -> Result<BsonDocument, DecodeError> {
        let body_end = start_document(r)?;
        let outer_end = r.end;
        r.end = body_end;
        let mut fields: BsonDocument = Vec::new();
        while r.x < body_end {
            let tag = r.u8().map_err(window_error)?;
            if tag == 0 {
                // Terminator before the declared length was consumed.
                return Err(DecodeError::new(DecodeErrorReason::SizeMismatch)
                    .with_level(PartialLevel::Document(fields)));
            }
            let name = match read_cstring(r, "cstring") {
                Ok(name) => name,
                Err(err) => return Err(err.with_level(PartialLevel::Document(fields))),
            };
            match self.read_value(r, tag) {
                Ok(value) => fields.push((name, value)),
                Err(err) => {
                    return Err(
                        err.nest(PathSegment::Field(name), PartialLevel::Document(fields))
                    )
                }
            }
        }
        r.end = outer_end;
        let terminator = r.u8().map_err(window_error)?;
        if terminator != 0 {
            return Err(DecodeError::new(DecodeErrorReason::ExpectedTrailingNull)
                .with_level(PartialLevel::Document(fields)));
        }
        Ok(fields)
    }

    fn read_array(&self, r: &mut Reader) -> Result<Vec<BsonValue>, DecodeError> {
        let body_end = start_document(r)?;
        let outer_end = r.end;
        r.end = body_end;
        let mut items: Vec<BsonValue> = Vec::new();
        while r.x < body_end {
            let tag = r.u8().map_err(window_error)?;
            if tag == 0 {
                return Err(DecodeError::new(DecodeErrorReason::SizeMismatch)
                    .with_level(PartialLevel::Array(items)));
            }
            // Index keys are redundant on the wire and never inspected.
            if let Err(err) = skip_cstring(r) {
                return Err(err.with_level(PartialLevel::Array(items)));
            }
            let index = items.len();
            match self.read_value(r, tag) {
                Ok(value) => items.push(value),
                Err(err) => {
                    return Err(err.nest(PathSegment::Index(index), PartialLevel::Array(items)))
                }
            }
        }
        r.end = outer_end;
        let terminator = r.u8().map_err(window_error)?;
        if terminator != 0 {
            return Err(DecodeError::new(DecodeErrorReason::ExpectedTrailingNull)
                .with_level(PartialLevel::Array(items)));
        }
        Ok(items)
    }

    fn read_value(&self, r: &mut Reader, tag: u8) -> Result<BsonValue, DecodeError> {
        match tag {
            TAG_FLOAT => read_float(r),
            TAG_STRING => Ok(BsonValue::Str(read_string(r, "string")?)),
            TAG_DOCUMENT => {
                let fields = self.read_document(r)?;
                Ok((self.options.build_document)(fields))
            }
            TAG_ARRAY => Ok(BsonValue::Array(self.read_array(r)?)),
            TAG_BINARY => self.read_binary(r),
            TAG_UNDEFINED => Ok(BsonValue::Null),
            TAG_OBJECT_ID => read_object_id(r),
            TAG_BOOLEAN => read_boolean(r),
            TAG_UTC_DATETIME => Ok(BsonValue::DateTime(
                r.i64().map_err(truncated("utc_datetime"))?,
            )),
            TAG_NULL => Ok(BsonValue::Null),
            TAG_REGEX => read_regex(r),
            TAG_JAVASCRIPT => Ok(BsonValue::JavaScriptCode(BsonJavascriptCode {
                code: read_string(r, "javascript")?,
            })),
            TAG_SYMBOL => Ok(BsonValue::Symbol(BsonSymbol {
                symbol: read_string(r, "symbol")?,
            })),
            TAG_JAVASCRIPT_WITH_SCOPE => self.read_code_with_scope(r),
            TAG_INT32 => Ok(BsonValue::Int32(r.i32().map_err(truncated("int32"))?)),
            TAG_TIMESTAMP => read_timestamp(r),
            TAG_INT64 => Ok(BsonValue::Int64(r.i64().map_err(truncated("int64"))?)),
            TAG_MIN_KEY => Ok(BsonValue::MinKey),
            TAG_MAX_KEY => Ok(BsonValue::MaxKey),
            _ => Err(DecodeError::new(DecodeErrorReason::UnsupportedElementTag(
                tag,
            ))),
        }
    }

    fn read_binary(&self, r: &mut Reader) -> Result<BsonValue, DecodeError> {
        let length = r.i32().map_err(truncated("binary"))?;
        if length < 0 {
            return Err(DecodeError::leaf("binary", DecodeErrorReason::SizeMismatch));
        }
        let subtype = r.u8().map_err(truncated("binary"))?;
        let data = r.buf(length as usize).map_err(truncated("binary"))?.to_vec();
        Ok((self.options.build_binary)(BinarySubtype::from(subtype), data))
    }

    fn read_code_with_scope(&self, r: &mut Reader) -> Result<BsonValue, DecodeError> {
        const KIND: &str = "javascript_with_scope";
        let start = r.x;
        let total = r.i32().map_err(truncated(KIND))?;
        // Smallest block: the length prefix, an empty string, an empty scope.
        if total < 14 {
            return Err(DecodeError::leaf(KIND, DecodeErrorReason::SizeMismatch));
        }
        let total = total as usize;
        if total > r.end - start {
            return Err(DecodeError::leaf(
                KIND,
                DecodeErrorReason::LengthExceedsBuffer,
            ));
        }
        let outer_end = r.end;
        r.end = start + total;
        let code = read_string(r, KIND)?;
        let scope = self.read_document(r)?;
        if r.x != start + total {
            return Err(DecodeError::leaf(KIND, DecodeErrorReason::SizeMismatch));
        }
        r.end = outer_end;
        Ok(BsonValue::JavaScriptCodeWithScope(
            BsonJavascriptCodeWithScope { code, scope },
        ))
    }
}

fn start_document(r: &mut Reader) -> Result<usize, DecodeError> {
    if r.size() < MIN_DOCUMENT_SIZE {
        return Err(DecodeError::new(DecodeErrorReason::DocumentTooShort));
    }
    let start = r.x;
    let total = r.i32().map_err(window_error)?;
    if total < MIN_DOCUMENT_SIZE as i32 {
        return Err(DecodeError::new(DecodeErrorReason::SizeMismatch));
    }
    let total = total as usize;
    if total > r.end - start {
        return Err(DecodeError::new(DecodeErrorReason::LengthExceedsBuffer));
    }
    // Position of the document's trailing null byte.
    Ok(start + total - 1)
}

fn read_float(r: &mut Reader) -> Result<BsonValue, DecodeError> {
    let value = r.f64().map_err(truncated("float"))?;
    Ok(match value.to_bits() {
        NAN_BITS => BsonValue::NaN,
        POS_INFINITY_BITS => BsonValue::PosInfinity,
        NEG_INFINITY_BITS => BsonValue::NegInfinity,
        _ => BsonValue::Float(value),
    })
}

// Length-prefixed string: int32 byte length including the trailing null.
fn read_string(r: &mut Reader, kind: &'static str) -> Result<String, DecodeError> {
    let length = r.i32().map_err(truncated(kind))?;
    if length < 1 {
        return Err(DecodeError::leaf(kind, DecodeErrorReason::SizeMismatch));
    }
    let length = length as usize;
    let bytes = r.buf(length).map_err(truncated(kind))?;
    if bytes[length - 1] != 0 {
        return Err(DecodeError::leaf(kind, DecodeErrorReason::InvalidCString));
    }
    let text = std::str::from_utf8(&bytes[..length - 1])
        .map_err(|_| DecodeError::leaf(kind, DecodeErrorReason::InvalidUtf8))?;
    Ok(text.to_owned())
}

fn read_cstring(r: &mut Reader, kind: &'static str) -> Result<String, DecodeError> {
    let window = &r.uint8[r.x..r.end];
    let nul = window
        .iter()
        .position(|&byte| byte == 0)
        .ok_or_else(|| DecodeError::leaf(kind, DecodeErrorReason::InvalidCString))?;
    let text = std::str::from_utf8(&window[..nul])
        .map_err(|_| DecodeError::leaf(kind, DecodeErrorReason::InvalidUtf8))?
        .to_owned();
    r.x += nul + 1;
    Ok(text)
}

fn skip_cstring(r: &mut Reader) -> Result<(), DecodeError> {
    let window = &r.uint8[r.x..r.end];
    let nul = window
        .iter()
        .position(|&byte| byte == 0)
        .ok_or_else(|| DecodeError::leaf("cstring", DecodeErrorReason::InvalidCString))?;
    r.x += nul + 1;
    Ok(())
}

fn read_object_id(r: &mut Reader) -> Result<BsonValue, DecodeError> {
    let slice = r.buf(12).map_err(truncated("objectid"))?;
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(slice);
    Ok(BsonValue::ObjectId(BsonObjectId { bytes }))
}

fn read_boolean(r: &mut Reader) -> Result<BsonValue, DecodeError> {
    let byte = r.u8().map_err(truncated("boolean"))?;
    match byte {
        0 => Ok(BsonValue::Boolean(false)),
        1 => Ok(BsonValue::Boolean(true)),
        other => Err(DecodeError::leaf(
            "boolean",
            DecodeErrorReason::InvalidBoolean(other),
        )),
    }
}

fn read_regex(r: &mut Reader) -> Result<BsonValue, DecodeError> {
    let pattern = read_cstring(r, "regex")?;
    let options = read_cstring(r, "regex")?;
    Ok(BsonValue::Regex(pattern, options))
}

fn read_timestamp(r: &mut Reader) -> Result<BsonValue, DecodeError> {
    let increment = r.i32().map_err(truncated("timestamp"))?;
    let timestamp = r.i32().map_err(truncated("timestamp"))?;
    Ok(BsonValue::Timestamp(BsonTimestamp {
        increment,
        timestamp,
    }))
}

fn truncated(kind: &'static str) -> impl Fn(BufferError) -> DecodeError {
    move |_| DecodeError::leaf(kind, DecodeErrorReason::TruncatedInput)
}

// Reads inside an already-validated window; a failure here means the
// declared sizes disagree with the content.
fn window_error(_: BufferError) -> DecodeError {
    DecodeError::new(DecodeErrorReason::SizeMismatch)
}
