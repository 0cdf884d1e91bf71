//! Tagged scalar values over the ten element types the scanner supports

use super::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a scan: signed and unsigned integers of widths 1, 2, 4
/// and 8 bytes plus the two float widths.
///
/// The kind fixes the stride of a full-memory scan and the equality policy
/// used when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    /// Byte width of one element of this kind.
    pub const fn width(&self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Resolves a REPL type code (`c s i l`, unsigned with a leading `u`,
    /// `f`, `d`). `u` and `ui` both name the 32-bit unsigned kind. The `t`
    /// string code is not a scalar kind and resolves to `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(ScalarKind::I8),
            "s" => Some(ScalarKind::I16),
            "i" => Some(ScalarKind::I32),
            "l" => Some(ScalarKind::I64),
            "uc" => Some(ScalarKind::U8),
            "us" => Some(ScalarKind::U16),
            "u" | "ui" => Some(ScalarKind::U32),
            "ul" => Some(ScalarKind::U64),
            "f" => Some(ScalarKind::F32),
            "d" => Some(ScalarKind::F64),
            _ => None,
        }
    }

    /// The canonical type code for this kind.
    pub const fn code(&self) -> &'static str {
        match self {
            ScalarKind::I8 => "c",
            ScalarKind::I16 => "s",
            ScalarKind::I32 => "i",
            ScalarKind::I64 => "l",
            ScalarKind::U8 => "uc",
            ScalarKind::U16 => "us",
            ScalarKind::U32 => "u",
            ScalarKind::U64 => "ul",
            ScalarKind::F32 => "f",
            ScalarKind::F64 => "d",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A (kind, bits) pair. Assignment replaces both together, so a chain's
/// remembered value can never disagree with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ScalarValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    pub const fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::I8(_) => ScalarKind::I8,
            ScalarValue::I16(_) => ScalarKind::I16,
            ScalarValue::I32(_) => ScalarKind::I32,
            ScalarValue::I64(_) => ScalarKind::I64,
            ScalarValue::U8(_) => ScalarKind::U8,
            ScalarValue::U16(_) => ScalarKind::U16,
            ScalarValue::U32(_) => ScalarKind::U32,
            ScalarValue::U64(_) => ScalarKind::U64,
            ScalarValue::F32(_) => ScalarKind::F32,
            ScalarValue::F64(_) => ScalarKind::F64,
        }
    }

    pub const fn width(&self) -> usize {
        self.kind().width()
    }

    /// Little-endian encoding of the raw bits.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            ScalarValue::I8(v) => v.to_le_bytes().to_vec(),
            ScalarValue::I16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::I32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::I64(v) => v.to_le_bytes().to_vec(),
            ScalarValue::U8(v) => v.to_le_bytes().to_vec(),
            ScalarValue::U16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::U32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::U64(v) => v.to_le_bytes().to_vec(),
            ScalarValue::F32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::F64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Decodes one element of `kind` from the front of `bytes`. Returns
    /// `None` when fewer than `kind.width()` bytes are available.
    pub fn from_le_bytes(bytes: &[u8], kind: ScalarKind) -> Option<Self> {
        if bytes.len() < kind.width() {
            return None;
        }

        let value = match kind {
            ScalarKind::I8 => ScalarValue::I8(bytes[0] as i8),
            ScalarKind::I16 => ScalarValue::I16(i16::from_le_bytes([bytes[0], bytes[1]])),
            ScalarKind::I32 => {
                ScalarValue::I32(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ScalarKind::I64 => ScalarValue::I64(i64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            ScalarKind::U8 => ScalarValue::U8(bytes[0]),
            ScalarKind::U16 => ScalarValue::U16(u16::from_le_bytes([bytes[0], bytes[1]])),
            ScalarKind::U32 => {
                ScalarValue::U32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ScalarKind::U64 => ScalarValue::U64(u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            ScalarKind::F32 => {
                ScalarValue::F32(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ScalarKind::F64 => ScalarValue::F64(f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
        };

        Some(value)
    }

    /// Parses `text` as a value of `kind`. Integer kinds accept decimal and
    /// `0x`-prefixed hex; float kinds accept the standard forms.
    pub fn parse(text: &str, kind: ScalarKind) -> Result<Self, MemoryError> {
        let bad = || MemoryError::ParseFailed(format!("'{}' is not a valid {} value", text, kind));

        let value = match kind {
            ScalarKind::I8 => ScalarValue::I8(parse_int::<u8>(text).map_err(|_| bad())? as i8),
            ScalarKind::I16 => ScalarValue::I16(parse_int::<u16>(text).map_err(|_| bad())? as i16),
            ScalarKind::I32 => ScalarValue::I32(parse_int::<u32>(text).map_err(|_| bad())? as i32),
            ScalarKind::I64 => ScalarValue::I64(parse_int::<u64>(text).map_err(|_| bad())? as i64),
            ScalarKind::U8 => ScalarValue::U8(parse_int::<u8>(text).map_err(|_| bad())?),
            ScalarKind::U16 => ScalarValue::U16(parse_int::<u16>(text).map_err(|_| bad())?),
            ScalarKind::U32 => ScalarValue::U32(parse_int::<u32>(text).map_err(|_| bad())?),
            ScalarKind::U64 => ScalarValue::U64(parse_int::<u64>(text).map_err(|_| bad())?),
            ScalarKind::F32 => ScalarValue::F32(text.parse().map_err(|_| bad())?),
            ScalarKind::F64 => ScalarValue::F64(text.parse().map_err(|_| bad())?),
        };

        Ok(value)
    }

    /// The bits reinterpreted as an unsigned integer of the same width,
    /// zero-extended to 64 bits. `None` for float kinds. Used for hex
    /// display and for deciding whether a value can carry a pointer.
    pub fn unsigned_bits(&self) -> Option<u64> {
        match *self {
            ScalarValue::I8(v) => Some(v as u8 as u64),
            ScalarValue::I16(v) => Some(v as u16 as u64),
            ScalarValue::I32(v) => Some(v as u32 as u64),
            ScalarValue::I64(v) => Some(v as u64),
            ScalarValue::U8(v) => Some(v as u64),
            ScalarValue::U16(v) => Some(v as u64),
            ScalarValue::U32(v) => Some(v as u64),
            ScalarValue::U64(v) => Some(v),
            ScalarValue::F32(_) | ScalarValue::F64(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::I8(v) => write!(f, "{}", v),
            ScalarValue::I16(v) => write!(f, "{}", v),
            ScalarValue::I32(v) => write!(f, "{}", v),
            ScalarValue::I64(v) => write!(f, "{}", v),
            ScalarValue::U8(v) => write!(f, "{}", v),
            ScalarValue::U16(v) => write!(f, "{}", v),
            ScalarValue::U32(v) => write!(f, "{}", v),
            ScalarValue::U64(v) => write!(f, "{}", v),
            ScalarValue::F32(v) => write!(f, "{}", v),
            ScalarValue::F64(v) => write!(f, "{}", v),
        }
    }
}

/// Decimal or `0x`-prefixed hex, parsed through the unsigned representation
/// so signed kinds accept raw bit patterns.
fn parse_int<T>(text: &str) -> Result<T, std::num::ParseIntError>
where
    T: UnsignedScalar,
{
    let text = text.trim();

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        T::from_str_radix(hex, 16)
    } else if let Some(negative) = text.strip_prefix('-') {
        // Negative decimal round-trips through the wrapping negation of the
        // unsigned magnitude so `-1` lands on the all-ones pattern.
        T::from_str_radix(negative, 10).map(T::wrapping_neg)
    } else {
        T::from_str_radix(text, 10)
    }
}

/// Unsigned primitives the integer parser can target.
pub trait UnsignedScalar: Sized + Copy {
    fn from_str_radix(src: &str, radix: u32) -> Result<Self, std::num::ParseIntError>;
    fn wrapping_neg(self) -> Self;
}

macro_rules! impl_unsigned_scalar {
    ($($ty:ty),*) => {
        $(impl UnsignedScalar for $ty {
            fn from_str_radix(src: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
                <$ty>::from_str_radix(src, radix)
            }

            fn wrapping_neg(self) -> Self {
                self.wrapping_neg()
            }
        })*
    };
}

impl_unsigned_scalar!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_widths() {
        assert_eq!(ScalarKind::I8.width(), 1);
        assert_eq!(ScalarKind::U16.width(), 2);
        assert_eq!(ScalarKind::I32.width(), 4);
        assert_eq!(ScalarKind::F32.width(), 4);
        assert_eq!(ScalarKind::U64.width(), 8);
        assert_eq!(ScalarKind::F64.width(), 8);
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(ScalarKind::from_code("c"), Some(ScalarKind::I8));
        assert_eq!(ScalarKind::from_code("s"), Some(ScalarKind::I16));
        assert_eq!(ScalarKind::from_code("i"), Some(ScalarKind::I32));
        assert_eq!(ScalarKind::from_code("l"), Some(ScalarKind::I64));
        assert_eq!(ScalarKind::from_code("uc"), Some(ScalarKind::U8));
        assert_eq!(ScalarKind::from_code("us"), Some(ScalarKind::U16));
        assert_eq!(ScalarKind::from_code("u"), Some(ScalarKind::U32));
        assert_eq!(ScalarKind::from_code("ui"), Some(ScalarKind::U32));
        assert_eq!(ScalarKind::from_code("ul"), Some(ScalarKind::U64));
        assert_eq!(ScalarKind::from_code("f"), Some(ScalarKind::F32));
        assert_eq!(ScalarKind::from_code("d"), Some(ScalarKind::F64));

        // 't' is the string command variant, not a scalar kind
        assert_eq!(ScalarKind::from_code("t"), None);
        assert_eq!(ScalarKind::from_code("x"), None);
    }

    #[test]
    fn test_value_round_trip() {
        let values = [
            ScalarValue::I8(-5),
            ScalarValue::I16(-300),
            ScalarValue::I32(-70000),
            ScalarValue::I64(-5_000_000_000),
            ScalarValue::U8(200),
            ScalarValue::U16(60000),
            ScalarValue::U32(4_000_000_000),
            ScalarValue::U64(u64::MAX),
            ScalarValue::F32(3.5),
            ScalarValue::F64(-2.25),
        ];

        for value in values {
            let bytes = value.to_le_bytes();
            assert_eq!(bytes.len(), value.width());
            let back = ScalarValue::from_le_bytes(&bytes, value.kind()).unwrap();
            assert_eq!(value, back);
        }
    }

    #[test]
    fn test_from_le_bytes_short_buffer() {
        assert_eq!(ScalarValue::from_le_bytes(&[1, 2], ScalarKind::I32), None);
        assert_eq!(ScalarValue::from_le_bytes(&[], ScalarKind::U8), None);
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        for kind in [
            ScalarKind::I8,
            ScalarKind::I16,
            ScalarKind::I32,
            ScalarKind::I64,
            ScalarKind::U8,
            ScalarKind::U16,
            ScalarKind::U32,
            ScalarKind::U64,
        ] {
            let from_hex = ScalarValue::parse("0x2a", kind).unwrap();
            let from_dec = ScalarValue::parse("42", kind).unwrap();
            assert_eq!(from_hex, from_dec, "kind {}", kind);
            assert_eq!(from_hex.unsigned_bits(), Some(42));
        }

        assert_eq!(
            ScalarValue::parse("1.5", ScalarKind::F32).unwrap(),
            ScalarValue::F32(1.5)
        );
        assert_eq!(
            ScalarValue::parse("1.5", ScalarKind::F64).unwrap(),
            ScalarValue::F64(1.5)
        );
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(
            ScalarValue::parse("-1", ScalarKind::I8).unwrap(),
            ScalarValue::I8(-1)
        );
        assert_eq!(
            ScalarValue::parse("-100", ScalarKind::I32).unwrap(),
            ScalarValue::I32(-100)
        );
        assert_eq!(
            ScalarValue::parse("-0.5", ScalarKind::F64).unwrap(),
            ScalarValue::F64(-0.5)
        );
    }

    #[test]
    fn test_parse_failure() {
        assert!(ScalarValue::parse("abc", ScalarKind::I32).is_err());
        assert!(ScalarValue::parse("0xGG", ScalarKind::U32).is_err());
        assert!(ScalarValue::parse("", ScalarKind::I32).is_err());
        assert!(ScalarValue::parse("1.5", ScalarKind::I32).is_err());
    }

    #[test]
    fn test_unsigned_bits() {
        assert_eq!(ScalarValue::I8(-1).unsigned_bits(), Some(0xFF));
        assert_eq!(ScalarValue::I32(-1).unsigned_bits(), Some(0xFFFF_FFFF));
        assert_eq!(ScalarValue::U64(7).unsigned_bits(), Some(7));
        assert_eq!(ScalarValue::F32(1.0).unsigned_bits(), None);
    }

    #[test]
    fn test_serialization() {
        let value = ScalarValue::I32(-42);
        let json = serde_json::to_string(&value).unwrap();
        let back: ScalarValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
