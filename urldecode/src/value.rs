//! Conversion of one raw value into the field it resolved to.

use core::num::{ParseFloatError, ParseIntError};
use core::str::FromStr;

use urldecode_core::{Def, PtrMut, ScalarType, Shape};

use crate::{DecodeError, ParseError, ParseErrorKind, TypeError};

/// Decodes `raw` into the value `target` points to.
///
/// Types with their own text decoding go first, then `Option` and `Box`
/// are decoded through (an empty `Option` gets a default value first), then
/// scalars are converted. Anything else is a [`TypeError`]. A scalar field
/// is only written once its value converted successfully.
///
/// # Safety
///
/// `target` must point to an initialized value of the type `shape` describes,
/// not borrowed elsewhere.
pub(crate) unsafe fn decode_value(
    target: PtrMut<'_>,
    shape: &'static Shape,
    raw: &[u8],
    key: &'static str,
) -> Result<(), DecodeError> {
    match shape.def {
        Def::Text(def) => unsafe { (def.unmarshal)(target, raw) }.map_err(DecodeError::Custom),
        Def::Option(def) => {
            let inner = unsafe { (def.get_or_init)(target) }.ok_or(TypeError::Uninstantiable {
                key,
                type_name: def.t().type_name(),
            })?;
            unsafe { decode_value(inner, def.t(), raw, key) }
        }
        Def::Pointer(def) => {
            let pointee = unsafe { (def.borrow_mut)(target) };
            unsafe { decode_value(pointee, def.pointee(), raw, key) }
        }
        Def::Scalar(scalar) => unsafe { decode_scalar(target, scalar, raw, key) },
        Def::Struct(_) | Def::Opaque => Err(TypeError::UnsupportedKind {
            key,
            type_name: shape.type_name(),
        }
        .into()),
    }
}

/// `1`, `y`, `Y`, then `yes` and `true` in any case. Everything else is
/// false, there is no error.
pub(crate) fn parse_bool(raw: &[u8]) -> bool {
    match raw.len() {
        1 => matches!(raw[0], b'1' | b'y' | b'Y'),
        3 => raw.eq_ignore_ascii_case(b"yes"),
        4 => raw.eq_ignore_ascii_case(b"true"),
        _ => false,
    }
}

fn as_str<'a>(raw: &'a [u8], key: &'static str) -> Result<&'a str, ParseError> {
    core::str::from_utf8(raw).map_err(|e| ParseError {
        key,
        kind: ParseErrorKind::InvalidUtf8(e),
    })
}

fn parse_int<T>(raw: &[u8], key: &'static str) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    as_str(raw, key)?.parse().map_err(|e| ParseError {
        key,
        kind: ParseErrorKind::Int(e),
    })
}

fn names_infinity(text: &str) -> bool {
    let magnitude = text.strip_prefix(['+', '-']).unwrap_or(text);
    magnitude.eq_ignore_ascii_case("inf") || magnitude.eq_ignore_ascii_case("infinity")
}

fn parse_float<T>(raw: &[u8], key: &'static str, is_infinite: fn(T) -> bool) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseFloatError> + Copy,
{
    let text = as_str(raw, key)?;
    let value: T = text.parse().map_err(|e| ParseError {
        key,
        kind: ParseErrorKind::Float(e),
    })?;
    if is_infinite(value) && !names_infinity(text) {
        return Err(ParseError {
            key,
            kind: ParseErrorKind::FloatOutOfRange,
        });
    }
    Ok(value)
}

/// # Safety
///
/// `target` must point to an initialized `T`.
unsafe fn store<T>(target: PtrMut<'_>, value: T) {
    *unsafe { target.as_mut::<T>() } = value;
}

unsafe fn decode_scalar(
    target: PtrMut<'_>,
    scalar: ScalarType,
    raw: &[u8],
    key: &'static str,
) -> Result<(), DecodeError> {
    unsafe {
        match scalar {
            ScalarType::Bool => store(target, parse_bool(raw)),
            ScalarType::I8 => store(target, parse_int::<i8>(raw, key)?),
            ScalarType::I16 => store(target, parse_int::<i16>(raw, key)?),
            ScalarType::I32 => store(target, parse_int::<i32>(raw, key)?),
            ScalarType::I64 => store(target, parse_int::<i64>(raw, key)?),
            ScalarType::ISize => store(target, parse_int::<isize>(raw, key)?),
            ScalarType::U8 => store(target, parse_int::<u8>(raw, key)?),
            ScalarType::U16 => store(target, parse_int::<u16>(raw, key)?),
            ScalarType::U32 => store(target, parse_int::<u32>(raw, key)?),
            ScalarType::U64 => store(target, parse_int::<u64>(raw, key)?),
            ScalarType::USize => store(target, parse_int::<usize>(raw, key)?),
            ScalarType::F32 => store(target, parse_float::<f32>(raw, key, f32::is_infinite)?),
            ScalarType::F64 => store(target, parse_float::<f64>(raw, key, f64::is_infinite)?),
            ScalarType::String => {
                let text = as_str(raw, key)?;
                let string = target.as_mut::<String>();
                string.clear();
                string.push_str(text);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shaped;

    fn decode<T: Shaped>(value: &mut T, raw: &str) -> Result<(), DecodeError> {
        unsafe { decode_value(PtrMut::new(value), T::SHAPE, raw.as_bytes(), "key") }
    }

    #[test]
    fn bool_truth_table() {
        for yes in ["1", "y", "Y", "yes", "YES", "yEs", "true", "TRUE", "True"] {
            assert!(parse_bool(yes.as_bytes()), "{yes:?} should be true");
        }
        for no in ["0", "", "n", "no", "false", "TRUE!", "yess", "t", "2", "on"] {
            assert!(!parse_bool(no.as_bytes()), "{no:?} should be false");
        }
    }

    #[test]
    fn bools_never_fail() {
        let mut flag = true;
        decode(&mut flag, "garbage").unwrap();
        assert!(!flag);
    }

    #[test]
    fn integers_respect_width() {
        let mut small = 0i8;
        decode(&mut small, "-128").unwrap();
        assert_eq!(small, -128);

        let err = decode(&mut small, "128").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Parse(ParseError {
                key: "key",
                kind: ParseErrorKind::Int(_)
            })
        ));
        assert_eq!(small, -128);

        let mut unsigned = 7u64;
        assert!(decode(&mut unsigned, "-1").is_err());
        assert!(decode(&mut unsigned, "abc").is_err());
        assert!(decode(&mut unsigned, "").is_err());
        assert_eq!(unsigned, 7);
    }

    #[test]
    fn floats() {
        let mut value = 0f64;
        decode(&mut value, "1.234").unwrap();
        assert_eq!(value, 1.234);
        decode(&mut value, "-2.5e3").unwrap();
        assert_eq!(value, -2500.0);
        decode(&mut value, "-Inf").unwrap();
        assert_eq!(value, f64::NEG_INFINITY);

        let mut single = 1f32;
        let err = decode(&mut single, "1e39").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Parse(ParseError {
                kind: ParseErrorKind::FloatOutOfRange,
                ..
            })
        ));
        assert_eq!(single, 1.0);
        assert!(decode(&mut single, "1.2.3").is_err());
    }

    #[test]
    fn strings_must_be_utf8() {
        let mut text = String::from("old");
        decode(&mut text, "café").unwrap();
        assert_eq!(text, "café");

        let err = unsafe {
            decode_value(PtrMut::new(&mut text), String::SHAPE, b"\xff", "key")
        }
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Parse(ParseError {
                kind: ParseErrorKind::InvalidUtf8(_),
                ..
            })
        ));
        assert_eq!(text, "café");
    }

    #[test]
    fn options_are_allocated() {
        let mut value: Option<u16> = None;
        decode(&mut value, "42").unwrap();
        assert_eq!(value, Some(42));

        let mut boxed: Option<Box<String>> = None;
        decode(&mut boxed, "hi").unwrap();
        assert_eq!(boxed.as_deref().map(String::as_str), Some("hi"));
    }

    #[test]
    fn unsupported_kinds_are_type_errors() {
        let mut list: Vec<u8> = Vec::new();
        let err = decode(&mut list, "1").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Type(TypeError::UnsupportedKind { key: "key", .. })
        ));
    }

    #[test]
    fn empty_trait_object_option_is_a_type_error() {
        let mut target: Option<Box<dyn crate::UnmarshalText>> = None;
        let err = decode(&mut target, "x").unwrap_err();
        insta::assert_snapshot!(err, @r#"field "key": can't decode into interface type Box<dyn UnmarshalText>"#);
    }
}
