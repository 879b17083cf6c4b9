//! Writer/Reader roundtrip matrix for the buffers crate.

use docwire_buffers::{BufferError, Reader, Writer};

// ---------------------------------------------------------------------------
// Writer/Reader roundtrip matrix
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_u8() {
    let mut w = Writer::new();
    w.u8(0x00);
    w.u8(0x7F);
    w.u8(0xFF);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u8(), Ok(0x00));
    assert_eq!(r.u8(), Ok(0x7F));
    assert_eq!(r.u8(), Ok(0xFF));
}

#[test]
fn roundtrip_i8() {
    let mut w = Writer::new();
    w.i8(i8::MIN);
    w.i8(-1);
    w.i8(0);
    w.i8(i8::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.i8(), Ok(i8::MIN));
    assert_eq!(r.i8(), Ok(-1));
    assert_eq!(r.i8(), Ok(0));
    assert_eq!(r.i8(), Ok(i8::MAX));
}

#[test]
fn roundtrip_u16() {
    let mut w = Writer::new();
    w.u16(0);
    w.u16(0x0102);
    w.u16(u16::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u16(), Ok(0));
    assert_eq!(r.u16(), Ok(0x0102));
    assert_eq!(r.u16(), Ok(u16::MAX));
}

#[test]
fn roundtrip_i16() {
    let mut w = Writer::new();
    w.i16(i16::MIN);
    w.i16(-1000);
    w.i16(0);
    w.i16(1000);
    w.i16(i16::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.i16(), Ok(i16::MIN));
    assert_eq!(r.i16(), Ok(-1000));
    assert_eq!(r.i16(), Ok(0));
    assert_eq!(r.i16(), Ok(1000));
    assert_eq!(r.i16(), Ok(i16::MAX));
}

#[test]
fn roundtrip_u32() {
    let mut w = Writer::new();
    w.u32(0);
    w.u32(0x01020304);
    w.u32(u32::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u32(), Ok(0));
    assert_eq!(r.u32(), Ok(0x01020304));
    assert_eq!(r.u32(), Ok(u32::MAX));
}

#[test]
fn roundtrip_i32() {
    let mut w = Writer::new();
    w.i32(i32::MIN);
    w.i32(-123456);
    w.i32(0);
    w.i32(123456);
    w.i32(i32::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.i32(), Ok(i32::MIN));
    assert_eq!(r.i32(), Ok(-123456));
    assert_eq!(r.i32(), Ok(0));
    assert_eq!(r.i32(), Ok(123456));
    assert_eq!(r.i32(), Ok(i32::MAX));
}

#[test]
fn roundtrip_u64() {
    let mut w = Writer::new();
    w.u64(0);
    w.u64(0x0102030405060708);
    w.u64(u64::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.u64(), Ok(0));
    assert_eq!(r.u64(), Ok(0x0102030405060708));
    assert_eq!(r.u64(), Ok(u64::MAX));
}

#[test]
fn roundtrip_i64() {
    let mut w = Writer::new();
    w.i64(i64::MIN);
    w.i64(-9_999_999_999);
    w.i64(0);
    w.i64(9_999_999_999);
    w.i64(i64::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.i64(), Ok(i64::MIN));
    assert_eq!(r.i64(), Ok(-9_999_999_999));
    assert_eq!(r.i64(), Ok(0));
    assert_eq!(r.i64(), Ok(9_999_999_999));
    assert_eq!(r.i64(), Ok(i64::MAX));
}

#[test]
fn roundtrip_f32() {
    let mut w = Writer::new();
    w.f32(0.0);
    w.f32(-1.5);
    w.f32(f32::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.f32(), Ok(0.0));
    assert_eq!(r.f32(), Ok(-1.5));
    assert_eq!(r.f32(), Ok(f32::MAX));
}

#[test]
fn roundtrip_f64() {
    let mut w = Writer::new();
    w.f64(0.0);
    w.f64(-1.5);
    w.f64(std::f64::consts::PI);
    w.f64(f64::MAX);
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.f64(), Ok(0.0));
    assert_eq!(r.f64(), Ok(-1.5));
    assert_eq!(r.f64(), Ok(std::f64::consts::PI));
    assert_eq!(r.f64(), Ok(f64::MAX));
}

#[test]
fn roundtrip_f64_preserves_nan_bits() {
    let bits: u64 = 0x7FF8_0000_0000_0001;
    let mut w = Writer::new();
    w.f64(f64::from_bits(bits));
    let data = w.flush();
    let mut r = Reader::new(&data);
    let val = r.f64().unwrap();
    assert_eq!(val.to_bits(), bits);
}

#[test]
fn roundtrip_buf_and_utf8() {
    let mut w = Writer::new();
    w.buf(&[0xDE, 0xAD]);
    w.utf8("héllo");
    let data = w.flush();
    let mut r = Reader::new(&data);
    assert_eq!(r.buf(2), Ok(&[0xDE, 0xAD][..]));
    assert_eq!(r.utf8("héllo".len()), Ok("héllo"));
}

// ---------------------------------------------------------------------------
// Bounds-check matrix
// ---------------------------------------------------------------------------

#[test]
fn reads_past_end_fail() {
    let data = [0x01, 0x02, 0x03];
    let mut r = Reader::new(&data);
    assert_eq!(r.u32(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.x, 0);
    assert_eq!(r.u16(), Ok(0x0201));
    assert_eq!(r.u16(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.u8(), Ok(0x03));
    assert_eq!(r.u8(), Err(BufferError::EndOfBuffer));
}

#[test]
fn failed_read_does_not_advance_cursor() {
    let data = [0x01, 0x02];
    let mut r = Reader::new(&data);
    assert_eq!(r.u64(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.buf(3), Err(BufferError::EndOfBuffer));
    assert_eq!(r.size(), 2);
}

#[test]
fn empty_input() {
    let mut r = Reader::new(&[]);
    assert_eq!(r.size(), 0);
    assert_eq!(r.peek(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.u8(), Err(BufferError::EndOfBuffer));
    assert_eq!(r.buf(0), Ok(&[][..]));
}
