//! BSON codec error types.
//!
//! Decode failures carry three things: the reason, the path from the
//! document root down to the failing element, and the partially decoded
//! content of every enclosing level. The partials make truncated or
//! corrupt wire data inspectable instead of all-or-nothing.

use std::fmt;

use thiserror::Error;

use crate::values::{BsonDocument, BsonValue};

/// Reason for a decode failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeErrorReason {
    /// Fewer than five bytes available where a document was expected.
    #[error("document too short")]
    DocumentTooShort,
    /// Declared document length runs past the enclosing boundary.
    #[error("document length exceeds buffer")]
    LengthExceedsBuffer,
    /// Declared length disagrees with the decoded content.
    #[error("document size mismatch")]
    SizeMismatch,
    /// The byte where the document terminator belongs is not null.
    #[error("expected trailing null byte")]
    ExpectedTrailingNull,
    /// Bytes remain after the top-level document.
    #[error("trailing bytes after document")]
    TrailingData,
    /// Element tag outside the supported set.
    #[error("unsupported element tag 0x{0:02x}")]
    UnsupportedElementTag(u8),
    /// A fixed-size value ran past the enclosing boundary.
    #[error("truncated input")]
    TruncatedInput,
    /// A cstring has no null terminator inside the enclosing boundary.
    #[error("cstring missing null terminator")]
    InvalidCString,
    /// String bytes are not valid UTF-8.
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    /// Boolean byte other than 0x00 or 0x01.
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBoolean(u8),
}

/// Reason for an encode failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeErrorReason {
    /// Integer value outside the signed 64-bit range.
    #[error("integer out of range")]
    IntegerOutOfRange,
    /// Document key contains a null byte.
    #[error("invalid document key")]
    InvalidKey,
    /// Value cannot be represented in BSON.
    #[error("unsupported value type")]
    UnsupportedValueType,
}

/// One step of the path from the document root to a failing element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Field name inside a document.
    Field(String),
    /// Position inside an array.
    Index(usize),
    /// Kind of the leaf value that failed to read, e.g. `"int32"`.
    Kind(&'static str),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{name}"),
            PathSegment::Index(index) => write!(f, "{index}"),
            PathSegment::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Partially decoded content of one enclosing level at failure time.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialLevel {
    /// Fields decoded before the failure, in wire order.
    Document(BsonDocument),
    /// Items decoded before the failure, in wire order.
    Array(Vec<BsonValue>),
}

/// A decode failure with location and recovered context.
///
/// `path` runs from the outermost level to the failure site, so the last
/// segment is the innermost. `partials` holds one entry per enclosing
/// document or array, outermost first; each entry contains everything that
/// level had successfully decoded before the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub path: Vec<PathSegment>,
    pub reason: DecodeErrorReason,
    pub partials: Vec<PartialLevel>,
}

impl DecodeError {
    pub(crate) fn new(reason: DecodeErrorReason) -> Self {
        Self {
            path: Vec::new(),
            reason,
            partials: Vec::new(),
        }
    }

    /// A failure while reading a leaf value of the given kind.
    pub(crate) fn leaf(kind: &'static str, reason: DecodeErrorReason) -> Self {
        Self {
            path: vec![PathSegment::Kind(kind)],
            reason,
            partials: Vec::new(),
        }
    }

    /// Wraps the error as seen from one level further out: the enclosing
    /// element's path segment and the enclosing level's partial content
    /// are prepended.
    pub(crate) fn nest(mut self, segment: PathSegment, level: PartialLevel) -> Self {
        self.path.insert(0, segment);
        self.partials.insert(0, level);
        self
    }

    /// Prepends an enclosing level's partial content without a path step.
    /// Used when the failure happens between elements, before any name is
    /// known.
    pub(crate) fn with_level(mut self, level: PartialLevel) -> Self {
        self.partials.insert(0, level);
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "decode error: {}", self.reason);
        }
        write!(f, "decode error at ")?;
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for DecodeError {}

/// An encode failure with location and the innermost level's output.
///
/// Encoding is fail-fast and returns no partial buffer, but the error
/// carries the already-encoded sibling elements of the level where the
/// failure happened, so callers can see how far the document got.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeError {
    pub path: Vec<PathSegment>,
    pub reason: EncodeErrorReason,
    /// Complete elements written at the failing level before the failure.
    pub partial: Option<Vec<u8>>,
}

impl EncodeError {
    pub(crate) fn new(reason: EncodeErrorReason) -> Self {
        Self {
            path: Vec::new(),
            reason,
            partial: None,
        }
    }

    /// Prepends the enclosing element's path segment.
    pub(crate) fn at(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Records the failing level's sibling bytes. Only the innermost
    /// level wins; outer levels leave an already-set snapshot alone.
    pub(crate) fn with_sibling_bytes(mut self, bytes: &[u8]) -> Self {
        if self.partial.is_none() {
            self.partial = Some(bytes.to_vec());
        }
        self
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "encode error: {}", self.reason);
        }
        write!(f, "encode error at ")?;
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display_without_path() {
        let err = DecodeError::new(DecodeErrorReason::TrailingData);
        assert_eq!(err.to_string(), "decode error: trailing bytes after document");
    }

    #[test]
    fn test_decode_error_display_with_path() {
        let err = DecodeError::leaf("int32", DecodeErrorReason::TruncatedInput)
            .nest(
                PathSegment::Index(2),
                PartialLevel::Array(vec![BsonValue::Null]),
            )
            .nest(
                PathSegment::Field("items".to_owned()),
                PartialLevel::Document(vec![]),
            );
        assert_eq!(err.to_string(), "decode error at items.2.int32: truncated input");
    }

    #[test]
    fn test_nest_orders_outermost_first() {
        let err = DecodeError::leaf("float", DecodeErrorReason::TruncatedInput)
            .nest(
                PathSegment::Field("inner".to_owned()),
                PartialLevel::Document(vec![("x".to_owned(), BsonValue::Int32(1))]),
            )
            .nest(
                PathSegment::Field("outer".to_owned()),
                PartialLevel::Document(vec![]),
            );
        assert_eq!(
            err.path,
            vec![
                PathSegment::Field("outer".to_owned()),
                PathSegment::Field("inner".to_owned()),
                PathSegment::Kind("float"),
            ]
        );
        assert_eq!(err.partials.len(), 2);
        assert_eq!(err.partials[0], PartialLevel::Document(vec![]));
        assert_eq!(
            err.partials[1],
            PartialLevel::Document(vec![("x".to_owned(), BsonValue::Int32(1))])
        );
    }

    #[test]
    fn test_encode_error_keeps_innermost_sibling_bytes() {
        let err = EncodeError::new(EncodeErrorReason::UnsupportedValueType)
            .with_sibling_bytes(&[0x10, 0x61, 0x00])
            .at(PathSegment::Field("a".to_owned()))
            .with_sibling_bytes(&[0xFF]);
        assert_eq!(err.partial, Some(vec![0x10, 0x61, 0x00]));
    }

    #[test]
    fn test_encode_error_display() {
        let err = EncodeError::new(EncodeErrorReason::InvalidKey)
            .at(PathSegment::Field("bad\u{0}key".to_owned()));
        assert_eq!(err.to_string(), "encode error at bad\u{0}key: invalid document key");
    }
}
