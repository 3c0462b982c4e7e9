//! Property-based tests for OPAQ format primitives

use opaq_format::varint::{decode_uleb128, encode_uleb128, zigzag_decode, zigzag_encode};
use proptest::prelude::*;

proptest! {
    #[test]
    fn uleb128_sequence_decodes_in_order(values in prop::collection::vec(any::<u64>(), 1..64)) {
        let mut buf = Vec::new();
        for value in &values {
            buf.extend_from_slice(&encode_uleb128(*value));
        }

        let mut cursor = 0;
        for expected in &values {
            let (decoded, consumed) = decode_uleb128(&buf[cursor..]).expect("decode ULEB128");
            prop_assert_eq!(decoded, *expected);
            cursor += consumed;
        }
        prop_assert_eq!(cursor, buf.len());
    }

    #[test]
    fn zigzag_keeps_small_magnitudes_short(value in -64i64..64) {
        let encoded = encode_uleb128(zigzag_encode(value));
        prop_assert_eq!(encoded.len(), 1);
        prop_assert_eq!(zigzag_decode(zigzag_encode(value)), value);
    }
}
