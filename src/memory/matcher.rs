//! Type-aware value equality

use crate::core::types::ScalarValue;

/// Absolute tolerance for float matching.
///
/// Chosen for the operator experience: a guessed in-game quantity often sits
/// in memory with noise in the low decimals, and an exact bit match would
/// miss it. Not scale-aware.
pub const FLOAT_TOLERANCE: f64 = 1e-3;

/// Equality under the scanner's matching policy.
///
/// Integer kinds compare bit-exact at their width and signedness. Float
/// kinds compare within [`FLOAT_TOLERANCE`]; a NaN operand never matches.
/// Values of different kinds never match.
pub fn values_equal(a: ScalarValue, b: ScalarValue) -> bool {
    use ScalarValue::*;

    match (a, b) {
        (I8(x), I8(y)) => x == y,
        (I16(x), I16(y)) => x == y,
        (I32(x), I32(y)) => x == y,
        (I64(x), I64(y)) => x == y,
        (U8(x), U8(y)) => x == y,
        (U16(x), U16(y)) => x == y,
        (U32(x), U32(y)) => x == y,
        (U64(x), U64(y)) => x == y,
        (F32(x), F32(y)) => (x as f64 - y as f64).abs() <= FLOAT_TOLERANCE,
        (F64(x), F64(y)) => (x - y).abs() <= FLOAT_TOLERANCE,
        _ => false,
    }
}
