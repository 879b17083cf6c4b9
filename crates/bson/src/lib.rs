//! BSON v1.0 wire codec for docwire.
//!
//! Documents are ordered lists of `(name, value)` pairs and round-trip
//! losslessly through [`encode`] and [`decode`], including field order,
//! duplicate keys, deprecated element types, and the canonical non-finite
//! float sentinels. Decode failures degrade gracefully: the error names
//! the failing element by path and carries every enclosing level's
//! partially decoded content.
//!
//! # Example
//!
//! ```
//! use docwire_bson::{decode, encode, BsonValue};
//!
//! let document = vec![
//!     ("greeting".to_owned(), BsonValue::from("hello")),
//!     ("count".to_owned(), BsonValue::from(3i64)),
//! ];
//! let bytes = encode(&document).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), BsonValue::Document(document));
//! ```

mod constants;
mod decoder;
mod encoder;
mod error;
mod json;
mod values;

pub use decoder::{BsonDecoder, DecodeOptions};
pub use encoder::BsonEncoder;
pub use error::{
    DecodeError, DecodeErrorReason, EncodeError, EncodeErrorReason, PartialLevel, PathSegment,
};
pub use json::{bson_to_json, JsonRenderError};
pub use values::{
    BinarySubtype, BsonBinary, BsonDocument, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonObjectId, BsonSymbol, BsonTimestamp, BsonValue,
};

/// Encodes a document with a fresh encoder.
pub fn encode(document: &[(String, BsonValue)]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = BsonEncoder::new();
    encoder.encode(document)
}

/// Encodes a JSON object with a fresh encoder.
pub fn encode_json(value: &serde_json::Value) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = BsonEncoder::new();
    encoder.encode_json(value)
}

/// Decodes a document with the default options.
pub fn decode(data: &[u8]) -> Result<BsonValue, DecodeError> {
    BsonDecoder::new().decode(data)
}

/// Decodes a document with custom materialization hooks.
pub fn decode_with(data: &[u8], options: DecodeOptions) -> Result<BsonValue, DecodeError> {
    BsonDecoder::with_options(options).decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convenience_roundtrip() {
        let document = vec![
            ("a".to_owned(), BsonValue::Int32(1)),
            ("b".to_owned(), BsonValue::from("two")),
        ];
        let bytes = encode(&document).unwrap();
        assert_eq!(decode(&bytes).unwrap(), BsonValue::Document(document));
    }

    #[test]
    fn test_default_options_match_plain_decode() {
        let bytes = encode(&[
            ("k".to_owned(), BsonValue::from("v")),
            (
                "b".to_owned(),
                BsonValue::Binary(BsonBinary {
                    subtype: BinarySubtype::Uuid,
                    data: vec![0x42; 16],
                }),
            ),
        ])
        .unwrap();
        assert_eq!(
            decode_with(&bytes, DecodeOptions::default()).unwrap(),
            decode(&bytes).unwrap()
        );
    }

    #[test]
    fn test_decode_with_custom_document_hook() {
        fn reversed(mut fields: BsonDocument) -> BsonValue {
            fields.reverse();
            BsonValue::Document(fields)
        }

        let bytes = encode(&[
            ("x".to_owned(), BsonValue::Int32(1)),
            ("y".to_owned(), BsonValue::Int32(2)),
        ])
        .unwrap();
        let options = DecodeOptions {
            build_document: reversed,
            ..DecodeOptions::default()
        };
        assert_eq!(
            decode_with(&bytes, options).unwrap(),
            BsonValue::Document(vec![
                ("y".to_owned(), BsonValue::Int32(2)),
                ("x".to_owned(), BsonValue::Int32(1)),
            ])
        );
    }

    #[test]
    fn test_decode_with_custom_binary_hook() {
        fn binary_as_string(_: BinarySubtype, data: Vec<u8>) -> BsonValue {
            BsonValue::Str(String::from_utf8_lossy(&data).into_owned())
        }

        let bytes = encode(&[(
            "payload".to_owned(),
            BsonValue::Binary(BsonBinary {
                subtype: BinarySubtype::Generic,
                data: b"raw".to_vec(),
            }),
        )])
        .unwrap();
        let options = DecodeOptions {
            build_binary: binary_as_string,
            ..DecodeOptions::default()
        };
        assert_eq!(
            decode_with(&bytes, options).unwrap(),
            BsonValue::Document(vec![("payload".to_owned(), BsonValue::Str("raw".to_owned()))])
        );
    }

    #[test]
    fn test_encode_json_and_render_back() {
        let value = serde_json::json!({"name": "ada", "age": 36});
        let bytes = encode_json(&value).unwrap();
        assert_eq!(bson_to_json(&bytes).unwrap(), value.to_string());
    }
}
