//! Standard primitive-to-byte converters.
//!
//! # Responsibility
//! - Provide ready-made `encode_*`/`decode_*` pairs for the visitor protocol.
//!
//! # Invariants
//! - Fixed-width values are big-endian.
//! - Text is UTF-8 with variable length.
//! - Decoders reject inputs whose width does not match the type.
//!
//! Callers may pass any other function with the same shape; nothing in the
//! protocol depends on this module.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Failure to turn stored bytes back into a typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    LengthMismatch {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },
    InvalidUtf8(FromUtf8Error),
    InvalidChar(u32),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch {
                type_name,
                expected,
                actual,
            } => write!(
                f,
                "cannot decode {type_name}: expected {expected} bytes, got {actual}"
            ),
            Self::InvalidUtf8(err) => write!(f, "stored text is not valid UTF-8: {err}"),
            Self::InvalidChar(value) => {
                write!(f, "stored value {value:#x} is not a unicode scalar value")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUtf8(err) => Some(err),
            Self::LengthMismatch { .. } | Self::InvalidChar(_) => None,
        }
    }
}

fn fixed<const N: usize>(type_name: &'static str, bytes: &[u8]) -> CodecResult<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| CodecError::LengthMismatch {
            type_name,
            expected: N,
            actual: bytes.len(),
        })
}

macro_rules! numeric_codec {
    ($($ty:ty => $encode:ident, $decode:ident;)*) => {
        $(
            #[doc = concat!("Encodes a `", stringify!($ty), "` as big-endian bytes.")]
            pub fn $encode(value: $ty) -> Vec<u8> {
                value.to_be_bytes().to_vec()
            }

            #[doc = concat!("Decodes a big-endian `", stringify!($ty), "`.")]
            pub fn $decode(bytes: &[u8]) -> CodecResult<$ty> {
                Ok(<$ty>::from_be_bytes(fixed(stringify!($ty), bytes)?))
            }
        )*
    };
}

numeric_codec! {
    i8 => encode_i8, decode_i8;
    u8 => encode_u8, decode_u8;
    i16 => encode_i16, decode_i16;
    i32 => encode_i32, decode_i32;
    i64 => encode_i64, decode_i64;
    f32 => encode_f32, decode_f32;
    f64 => encode_f64, decode_f64;
}

/// Encodes `true` as `[1]` and `false` as `[0]`.
pub fn encode_bool(value: bool) -> Vec<u8> {
    vec![u8::from(value)]
}

/// Decodes one byte; any non-zero byte is `true`.
pub fn decode_bool(bytes: &[u8]) -> CodecResult<bool> {
    let [byte] = fixed::<1>("bool", bytes)?;
    Ok(byte != 0)
}

/// Encodes a `char` as its 4-byte big-endian scalar value.
pub fn encode_char(value: char) -> Vec<u8> {
    u32::from(value).to_be_bytes().to_vec()
}

pub fn decode_char(bytes: &[u8]) -> CodecResult<char> {
    let scalar = u32::from_be_bytes(fixed("char", bytes)?);
    char::from_u32(scalar).ok_or(CodecError::InvalidChar(scalar))
}

pub fn encode_str(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn encode_string(value: String) -> Vec<u8> {
    value.into_bytes()
}

pub fn decode_string(bytes: &[u8]) -> CodecResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(CodecError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        assert_eq!(encode_i32(42), vec![0, 0, 0, 42]);
        assert_eq!(encode_i16(-2), vec![0xff, 0xfe]);
        assert_eq!(decode_i64(&encode_i64(i64::MIN)).unwrap(), i64::MIN);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        let err = decode_i32(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                type_name: "i32",
                expected: 4,
                actual: 3,
            }
        );
        assert!(decode_bool(&[]).is_err());
        assert!(decode_f64(&[0; 4]).is_err());
    }

    #[test]
    fn floats_keep_their_bit_patterns() {
        let nan = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(decode_f64(&encode_f64(nan)).unwrap().to_bits(), nan.to_bits());
        assert_eq!(decode_f32(&encode_f32(-0.0)).unwrap().to_bits(), (-0.0f32).to_bits());
        assert_eq!(encode_f32(1.0), vec![0x3f, 0x80, 0, 0]);
    }

    #[test]
    fn bool_treats_any_non_zero_byte_as_true() {
        assert!(decode_bool(&[0x80]).unwrap());
        assert!(!decode_bool(&encode_bool(false)).unwrap());
    }

    #[test]
    fn char_rejects_surrogates() {
        let err = decode_char(&0xD800_u32.to_be_bytes()).unwrap_err();
        assert_eq!(err, CodecError::InvalidChar(0xD800));
        assert_eq!(decode_char(&encode_char('ß')).unwrap(), 'ß');
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        assert!(matches!(
            decode_string(&[0xff, 0xfe]),
            Err(CodecError::InvalidUtf8(_))
        ));
        assert_eq!(decode_string(&encode_str("")).unwrap(), "");
    }
}
