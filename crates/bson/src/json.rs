//! Direct BSON to JSON text rendering.
//!
//! Walks the wire bytes and appends JSON text as it goes, without
//! building the value model. Structural validation matches the decoder:
//! nested lengths are confined to their enclosing level and the trailing
//! null of every document is checked.
//!
//! Only element types with a clean JSON mapping are rendered: doubles,
//! strings, documents, arrays, object ids (as 24-character lowercase hex
//! strings), int32 and int64. Non-finite doubles render as `null`.
//! Anything else fails with [`JsonRenderError::UnsupportedTag`].

use docwire_buffers::Reader;
use thiserror::Error;

use crate::constants::*;

/// Error type for direct JSON rendering.
#[derive(Debug, Error)]
pub enum JsonRenderError {
    #[error("truncated document")]
    Truncated,
    #[error("document size mismatch")]
    SizeMismatch,
    #[error("expected trailing null byte")]
    ExpectedTrailingNull,
    #[error("trailing bytes after document")]
    TrailingData,
    #[error("unsupported element tag 0x{0:02x}")]
    UnsupportedTag(u8),
    #[error("cstring missing null terminator")]
    InvalidCString,
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Renders a BSON document as a JSON string.
pub fn bson_to_json(data: &[u8]) -> Result<String, JsonRenderError> {
    let mut reader = Reader::new(data);
    let mut out = String::new();
    render_document(&mut reader, &mut out)?;
    if reader.x != data.len() {
        return Err(JsonRenderError::TrailingData);
    }
    Ok(out)
}

fn render_document(r: &mut Reader, out: &mut String) -> Result<(), JsonRenderError> {
    let body_end = begin_document(r)?;
    let outer_end = r.end;
    r.end = body_end;
    out.push('{');
    let mut first = true;
    while r.x < body_end {
        let tag = r.u8().map_err(|_| JsonRenderError::SizeMismatch)?;
        if tag == 0 {
            return Err(JsonRenderError::SizeMismatch);
        }
        let name = read_cstring(r)?;
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&serde_json::to_string(name)?);
        out.push(':');
        render_value(r, tag, out)?;
    }
    r.end = outer_end;
    let terminator = r.u8().map_err(|_| JsonRenderError::SizeMismatch)?;
    if terminator != 0 {
        return Err(JsonRenderError::ExpectedTrailingNull);
    }
    out.push('}');
    Ok(())
}

fn render_array(r: &mut Reader, out: &mut String) -> Result<(), JsonRenderError> {
    let body_end = begin_document(r)?;
    let outer_end = r.end;
    r.end = body_end;
    out.push('[');
    let mut first = true;
    while r.x < body_end {
        let tag = r.u8().map_err(|_| JsonRenderError::SizeMismatch)?;
        if tag == 0 {
            return Err(JsonRenderError::SizeMismatch);
        }
        skip_cstring(r)?;
        if !first {
            out.push(',');
        }
        first = false;
        render_value(r, tag, out)?;
    }
    r.end = outer_end;
    let terminator = r.u8().map_err(|_| JsonRenderError::SizeMismatch)?;
    if terminator != 0 {
        return Err(JsonRenderError::ExpectedTrailingNull);
    }
    out.push(']');
    Ok(())
}

fn render_value(r: &mut Reader, tag: u8, out: &mut String) -> Result<(), JsonRenderError> {
    match tag {
        TAG_FLOAT => {
            let value = r.f64().map_err(|_| JsonRenderError::Truncated)?;
            match serde_json::Number::from_f64(value) {
                Some(number) => out.push_str(&number.to_string()),
                None => out.push_str("null"),
            }
        }
        TAG_STRING => {
            let text = read_string(r)?;
            out.push_str(&serde_json::to_string(text)?);
        }
        TAG_DOCUMENT => render_document(r, out)?,
        TAG_ARRAY => render_array(r, out)?,
        TAG_OBJECT_ID => {
            let bytes = r.buf(12).map_err(|_| JsonRenderError::Truncated)?;
            out.push('"');
            for &byte in bytes {
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0F) as usize] as char);
            }
            out.push('"');
        }
        TAG_INT32 => {
            let value = r.i32().map_err(|_| JsonRenderError::Truncated)?;
            out.push_str(&value.to_string());
        }
        TAG_INT64 => {
            let value = r.i64().map_err(|_| JsonRenderError::Truncated)?;
            out.push_str(&value.to_string());
        }
        other => return Err(JsonRenderError::UnsupportedTag(other)),
    }
    Ok(())
}

fn begin_document(r: &mut Reader) -> Result<usize, JsonRenderError> {
    if r.size() < MIN_DOCUMENT_SIZE {
        return Err(JsonRenderError::Truncated);
    }
    let start = r.x;
    let total = r.i32().map_err(|_| JsonRenderError::Truncated)?;
    if total < MIN_DOCUMENT_SIZE as i32 {
        return Err(JsonRenderError::SizeMismatch);
    }
    let total = total as usize;
    if total > r.end - start {
        return Err(JsonRenderError::Truncated);
    }
    Ok(start + total - 1)
}

fn read_cstring<'a>(r: &mut Reader<'a>) -> Result<&'a str, JsonRenderError> {
    let window = &r.uint8[r.x..r.end];
    let nul = window
        .iter()
        .position(|&byte| byte == 0)
        .ok_or(JsonRenderError::InvalidCString)?;
    let text = std::str::from_utf8(&window[..nul]).map_err(|_| JsonRenderError::InvalidUtf8)?;
    r.x += nul + 1;
    Ok(text)
}

fn skip_cstring(r: &mut Reader) -> Result<(), JsonRenderError> {
    let window = &r.uint8[r.x..r.end];
    let nul = window
        .iter()
        .position(|&byte| byte == 0)
        .ok_or(JsonRenderError::InvalidCString)?;
    r.x += nul + 1;
    Ok(())
}

fn read_string<'a>(r: &mut Reader<'a>) -> Result<&'a str, JsonRenderError> {
    let length = r.i32().map_err(|_| JsonRenderError::Truncated)?;
    if length < 1 {
        return Err(JsonRenderError::SizeMismatch);
    }
    let length = length as usize;
    let bytes = r.buf(length).map_err(|_| JsonRenderError::Truncated)?;
    if bytes[length - 1] != 0 {
        return Err(JsonRenderError::InvalidCString);
    }
    std::str::from_utf8(&bytes[..length - 1]).map_err(|_| JsonRenderError::InvalidUtf8)
}
