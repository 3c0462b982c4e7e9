//! Constants for the OPAQ wire format

/// Class descriptor for a `null` value.
pub const CLASS_NULL: u64 = 0;
/// Class descriptor prefix for arrays; the component descriptor follows.
pub const CLASS_ARRAY: u64 = 1;
/// Class descriptor for boxed booleans.
pub const CLASS_BOOLEAN: u64 = 2;
/// Class descriptor for boxed 32-bit integers.
pub const CLASS_INTEGER: u64 = 3;
/// Class descriptor for boxed 64-bit integers.
pub const CLASS_LONG: u64 = 4;
/// Class descriptor for boxed doubles.
pub const CLASS_DOUBLE: u64 = 5;
/// Class descriptor for strings.
pub const CLASS_STRING: u64 = 6;
/// Class descriptor for the root reference type (array component only).
pub const CLASS_OBJECT: u64 = 7;
/// Class descriptor for the abstract numeric type (array component only).
pub const CLASS_NUMBER: u64 = 8;
/// Class descriptor for the primitive boolean component.
pub const CLASS_PRIMITIVE_BOOLEAN: u64 = 9;
/// Class descriptor for the primitive int component.
pub const CLASS_PRIMITIVE_INT: u64 = 10;
/// Class descriptor for the primitive long component.
pub const CLASS_PRIMITIVE_LONG: u64 = 11;
/// Class descriptor for the primitive double component.
pub const CLASS_PRIMITIVE_DOUBLE: u64 = 12;
/// First id handed out to registered classes; ids below are reserved.
pub const FIRST_REGISTERED_CLASS: u64 = 16;

/// Reference marker announcing a new object whose body follows.
pub const REF_NEW: u64 = 0;
/// Offset added to an object index to form a back-reference marker.
pub const REF_BACK_OFFSET: u64 = 1;

/// Maximum encoded length of a ULEB128 u64.
pub const MAX_VARINT_LEN: usize = 10;
