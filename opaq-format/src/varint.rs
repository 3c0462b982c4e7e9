//! Variable-length integer encoding (ULEB128 / ZigZag)

use smallvec::SmallVec;

use crate::constants::MAX_VARINT_LEN;
use crate::error::OpaqError;

/// Encode a u64 as ULEB128
pub fn encode_uleb128(val: u64) -> SmallVec<[u8; MAX_VARINT_LEN]> {
    let mut result = SmallVec::new();
    let mut x = val;

    while x >= 0x80 {
        result.push((x & 0x7F) as u8 | 0x80);
        x >>= 7;
    }
    result.push((x & 0x7F) as u8);

    result
}

/// Decode ULEB128 from bytes, returning the value and the bytes consumed
pub fn decode_uleb128(bytes: &[u8]) -> Result<(u64, usize), OpaqError> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(OpaqError::LimitExceeded("ULEB128 too long".to_string()));
        }

        let chunk = (byte & 0x7F) as u64;
        if shift == 63 && chunk > 1 {
            return Err(OpaqError::Corrupt("ULEB128 overflows u64".to_string()));
        }
        result |= chunk << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, i + 1));
        }

        shift += 7;
    }

    Err(OpaqError::UnexpectedEof)
}

/// ZigZag encode a signed integer
pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// ZigZag decode to signed integer
pub fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}
