//! BSON document encoder.
//!
//! Encoding is fail-fast: any error aborts the whole encode and no bytes
//! are returned. Document and code-with-scope lengths are back-patched
//! into a reserved slot once the content size is known.

use docwire_buffers::Writer;

use crate::constants::*;
use crate::error::{EncodeError, EncodeErrorReason, PathSegment};
use crate::values::{BsonBinary, BsonObjectId, BsonTimestamp, BsonValue};

/// BSON document encoder.
pub struct BsonEncoder {
    pub writer: Writer,
}

impl Default for BsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes a document and returns the encoded bytes.
    pub fn encode(&mut self, document: &[(String, BsonValue)]) -> Result<Vec<u8>, EncodeError> {
        self.writer.reset();
        self.write_document(document)?;
        Ok(self.writer.flush())
    }

    /// Encodes a JSON object directly, without building a value tree.
    ///
    /// Integers that fit the signed 32-bit range become Int32 elements,
    /// other integers become Int64, floats become doubles. Unsigned
    /// integers above `i64::MAX` fail with
    /// [`EncodeErrorReason::IntegerOutOfRange`]. The top-level JSON value
    /// must be an object.
    pub fn encode_json(&mut self, value: &serde_json::Value) -> Result<Vec<u8>, EncodeError> {
        self.writer.reset();
        match value {
            serde_json::Value::Object(map) => self.write_json_document(map)?,
            _ => return Err(EncodeError::new(EncodeErrorReason::UnsupportedValueType)),
        }
        Ok(self.writer.flush())
    }

    /// Writes a complete document at the current writer position.
    pub fn write_document(&mut self, fields: &[(String, BsonValue)]) -> Result<(), EncodeError> {
        let slot = self.reserve_size();
        for (name, value) in fields {
            let element_start = self.writer.x;
            if let Err(err) = self.write_element(name, value) {
                return Err(err
                    .at(PathSegment::Field(name.clone()))
                    .with_sibling_bytes(&self.writer.uint8[slot + 4..element_start]));
            }
        }
        self.writer.u8(0);
        self.patch_size(slot);
        Ok(())
    }

    fn write_array(&mut self, items: &[BsonValue]) -> Result<(), EncodeError> {
        let slot = self.reserve_size();
        for (index, value) in items.iter().enumerate() {
            let element_start = self.writer.x;
            let key = index.to_string();
            if let Err(err) = self.write_element(&key, value) {
                return Err(err
                    .at(PathSegment::Index(index))
                    .with_sibling_bytes(&self.writer.uint8[slot + 4..element_start]));
            }
        }
        self.writer.u8(0);
        self.patch_size(slot);
        Ok(())
    }

    fn write_element(&mut self, name: &str, value: &BsonValue) -> Result<(), EncodeError> {
        match value {
            BsonValue::Float(float) => {
                self.tag_and_name(TAG_FLOAT, name)?;
                self.writer.f64(*float);
            }
            BsonValue::NaN => {
                self.tag_and_name(TAG_FLOAT, name)?;
                self.writer.f64(f64::from_bits(NAN_BITS));
            }
            BsonValue::PosInfinity => {
                self.tag_and_name(TAG_FLOAT, name)?;
                self.writer.f64(f64::from_bits(POS_INFINITY_BITS));
            }
            BsonValue::NegInfinity => {
                self.tag_and_name(TAG_FLOAT, name)?;
                self.writer.f64(f64::from_bits(NEG_INFINITY_BITS));
            }
            BsonValue::Str(string) => {
                self.tag_and_name(TAG_STRING, name)?;
                self.write_string(string);
            }
            BsonValue::Document(fields) => {
                self.tag_and_name(TAG_DOCUMENT, name)?;
                self.write_document(fields)?;
            }
            BsonValue::Array(items) => {
                self.tag_and_name(TAG_ARRAY, name)?;
                self.write_array(items)?;
            }
            BsonValue::Binary(BsonBinary { subtype, data }) => {
                self.tag_and_name(TAG_BINARY, name)?;
                self.writer.i32(data.len() as i32);
                self.writer.u8(u8::from(*subtype));
                self.writer.buf(data);
            }
            BsonValue::ObjectId(BsonObjectId { bytes }) => {
                self.tag_and_name(TAG_OBJECT_ID, name)?;
                self.writer.buf(bytes);
            }
            BsonValue::Boolean(boolean) => {
                self.tag_and_name(TAG_BOOLEAN, name)?;
                self.writer.u8(u8::from(*boolean));
            }
            BsonValue::DateTime(millis) => {
                self.tag_and_name(TAG_UTC_DATETIME, name)?;
                self.writer.i64(*millis);
            }
            BsonValue::Null => {
                self.tag_and_name(TAG_NULL, name)?;
            }
            BsonValue::Regex(pattern, options) => {
                self.tag_and_name(TAG_REGEX, name)?;
                self.write_regex_cstring(pattern)?;
                self.write_regex_cstring(options)?;
            }
            BsonValue::JavaScriptCode(code) => {
                self.tag_and_name(TAG_JAVASCRIPT, name)?;
                self.write_string(&code.code);
            }
            BsonValue::Symbol(symbol) => {
                self.tag_and_name(TAG_SYMBOL, name)?;
                self.write_string(&symbol.symbol);
            }
            BsonValue::JavaScriptCodeWithScope(code) => {
                self.tag_and_name(TAG_JAVASCRIPT_WITH_SCOPE, name)?;
                let slot = self.reserve_size();
                self.write_string(&code.code);
                self.write_document(&code.scope)?;
                self.patch_size(slot);
            }
            BsonValue::Int32(int) => {
                self.tag_and_name(TAG_INT32, name)?;
                self.writer.i32(*int);
            }
            BsonValue::Timestamp(BsonTimestamp {
                increment,
                timestamp,
            }) => {
                self.tag_and_name(TAG_TIMESTAMP, name)?;
                self.writer.i32(*increment);
                self.writer.i32(*timestamp);
            }
            BsonValue::Int64(int) => {
                self.tag_and_name(TAG_INT64, name)?;
                self.writer.i64(*int);
            }
            BsonValue::MinKey => {
                self.tag_and_name(TAG_MIN_KEY, name)?;
            }
            BsonValue::MaxKey => {
                self.tag_and_name(TAG_MAX_KEY, name)?;
            }
        }
        Ok(())
    }

    fn write_json_document(
        &mut self,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), EncodeError> {
        let slot = self.reserve_size();
        for (name, value) in map {
            let element_start = self.writer.x;
            if let Err(err) = self.write_json_element(name, value) {
                return Err(err
                    .at(PathSegment::Field(name.clone()))
                    .with_sibling_bytes(&self.writer.uint8[slot + 4..element_start]));
            }
        }
        self.writer.u8(0);
        self.patch_size(slot);
        Ok(())
    }

    fn write_json_array(&mut self, items: &[serde_json::Value]) -> Result<(), EncodeError> {
        let slot = self.reserve_size();
        for (index, value) in items.iter().enumerate() {
            let element_start = self.writer.x;
            let key = index.to_string();
            if let Err(err) = self.write_json_element(&key, value) {
                return Err(err
                    .at(PathSegment::Index(index))
                    .with_sibling_bytes(&self.writer.uint8[slot + 4..element_start]));
            }
        }
        self.writer.u8(0);
        self.patch_size(slot);
        Ok(())
    }

    fn write_json_element(
        &mut self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<(), EncodeError> {
        match value {
            serde_json::Value::Null => {
                self.tag_and_name(TAG_NULL, name)?;
            }
            serde_json::Value::Bool(boolean) => {
                self.tag_and_name(TAG_BOOLEAN, name)?;
                self.writer.u8(u8::from(*boolean));
            }
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    if int >= i32::MIN as i64 && int <= i32::MAX as i64 {
                        self.tag_and_name(TAG_INT32, name)?;
                        self.writer.i32(int as i32);
                    } else {
                        self.tag_and_name(TAG_INT64, name)?;
                        self.writer.i64(int);
                    }
                } else if number.is_u64() {
                    return Err(EncodeError::new(EncodeErrorReason::IntegerOutOfRange));
                } else if let Some(float) = number.as_f64() {
                    self.tag_and_name(TAG_FLOAT, name)?;
                    self.writer.f64(float);
                } else {
                    return Err(EncodeError::new(EncodeErrorReason::UnsupportedValueType));
                }
            }
            serde_json::Value::String(string) => {
                self.tag_and_name(TAG_STRING, name)?;
                self.write_string(string);
            }
            serde_json::Value::Array(items) => {
                self.tag_and_name(TAG_ARRAY, name)?;
                self.write_json_array(items)?;
            }
            serde_json::Value::Object(map) => {
                self.tag_and_name(TAG_DOCUMENT, name)?;
                self.write_json_document(map)?;
            }
        }
        Ok(())
    }

    fn tag_and_name(&mut self, tag: u8, name: &str) -> Result<(), EncodeError> {
        if name.as_bytes().contains(&0) {
            return Err(EncodeError::new(EncodeErrorReason::InvalidKey));
        }
        self.writer.u8(tag);
        self.writer.utf8(name);
        self.writer.u8(0);
        Ok(())
    }

    // Regex pattern and options are cstrings, so a null byte in either
    // makes the value unrepresentable.
    fn write_regex_cstring(&mut self, value: &str) -> Result<(), EncodeError> {
        if value.as_bytes().contains(&0) {
            return Err(EncodeError::new(EncodeErrorReason::UnsupportedValueType));
        }
        self.writer.utf8(value);
        self.writer.u8(0);
        Ok(())
    }

    // Length-prefixed string: int32 byte length including the trailing
    // null, then the UTF-8 bytes, then the null.
    fn write_string(&mut self, value: &str) {
        self.writer.i32(value.len() as i32 + 1);
        self.writer.utf8(value);
        self.writer.u8(0);
    }

    fn reserve_size(&mut self) -> usize {
        self.writer.ensure_capacity(4);
        let slot = self.writer.x;
        self.writer.x += 4;
        slot
    }

    fn patch_size(&mut self, slot: usize) {
        let total = (self.writer.x - slot) as i32;
        self.writer.uint8[slot..slot + 4].copy_from_slice(&total.to_le_bytes());
    }
}
