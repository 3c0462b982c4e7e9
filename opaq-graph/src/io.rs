//! Byte-level output and input buffers

use bytes::{BufMut, Bytes, BytesMut};
use opaq_format::varint::{decode_uleb128, encode_uleb128, zigzag_decode, zigzag_encode};
use opaq_format::{Limits, OpaqError, Result};

/// Growable output buffer
#[derive(Debug, Default)]
pub struct Output {
    buf: BytesMut,
}

impl Output {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Write one byte
    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Write an unsigned ULEB128 varint
    pub fn write_varint(&mut self, v: u64) {
        self.buf.put_slice(&encode_uleb128(v));
    }

    /// Write a signed ZigZag varint
    pub fn write_varint_signed(&mut self, v: i64) {
        self.write_varint(zigzag_encode(v));
    }

    /// Write a little-endian double
    pub fn write_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    /// Write a length-prefixed UTF-8 string
    pub fn write_str(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.put_slice(s.as_bytes());
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze into immutable bytes
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Cursor over encoded bytes
#[derive(Debug)]
pub struct Input<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    /// Cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(OpaqError::UnexpectedEof)?;
        if end > self.bytes.len() {
            return Err(OpaqError::UnexpectedEof);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read an unsigned ULEB128 varint
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_uleb128(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a signed ZigZag varint
    pub fn read_varint_signed(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.read_varint()?))
    }

    /// Read a little-endian double
    pub fn read_f64(&mut self) -> Result<f64> {
        let raw = self.take(8)?;
        let mut le = [0u8; 8];
        le.copy_from_slice(raw);
        Ok(f64::from_le_bytes(le))
    }

    /// Read a length-prefixed UTF-8 string within the configured string limit
    pub fn read_str(&mut self, limits: &Limits) -> Result<&'a str> {
        let len = limits.check_string_len(self.read_varint()?)?;
        let raw = self.take(len)?;
        std::str::from_utf8(raw).map_err(|_| OpaqError::Corrupt("invalid UTF-8 string".to_string()))
    }
}
