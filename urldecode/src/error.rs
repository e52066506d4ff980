//! Errors returned while decoding a query string.

use core::fmt;
use core::num::{ParseFloatError, ParseIntError};
use core::str::Utf8Error;

use urldecode_core::TextError;

/// Anything that can go wrong while decoding a query string into a struct.
#[derive(Debug)]
pub enum DecodeError {
    /// A `%` was not followed by two hex digits. Nothing was decoded.
    Escape(EscapeError),

    /// The destination, or one of the fields a key resolved to, has a type
    /// query values can't be decoded into.
    Type(TypeError),

    /// A value could not be converted to its field's type.
    Parse(ParseError),

    /// A field's own [`UnmarshalText`](crate::UnmarshalText) implementation
    /// failed. Displays as the inner error.
    Custom(TextError),

    /// Reading the source failed.
    Io(std::io::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Escape(e) => fmt::Display::fmt(e, f),
            DecodeError::Type(e) => fmt::Display::fmt(e, f),
            DecodeError::Parse(e) => fmt::Display::fmt(e, f),
            DecodeError::Custom(e) => fmt::Display::fmt(e, f),
            DecodeError::Io(e) => write!(f, "reading query: {e}"),
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DecodeError::Escape(_) | DecodeError::Type(_) => None,
            DecodeError::Parse(e) => e.kind.source(),
            // transparent: the custom error is this error
            DecodeError::Custom(e) => e.source(),
            DecodeError::Io(e) => Some(e),
        }
    }
}

impl From<EscapeError> for DecodeError {
    fn from(e: EscapeError) -> Self {
        DecodeError::Escape(e)
    }
}

impl From<TypeError> for DecodeError {
    fn from(e: TypeError) -> Self {
        DecodeError::Type(e)
    }
}

impl From<ParseError> for DecodeError {
    fn from(e: ParseError) -> Self {
        DecodeError::Parse(e)
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        DecodeError::Io(e)
    }
}

/// A malformed percent escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    fragment: [u8; 3],
    len: u8,
    offset: usize,
}

impl EscapeError {
    pub(crate) fn new(fragment: &[u8], offset: usize) -> Self {
        let len = fragment.len().min(3);
        let mut bytes = [0; 3];
        bytes[..len].copy_from_slice(&fragment[..len]);
        Self {
            fragment: bytes,
            len: len as u8,
            offset,
        }
    }

    /// The offending bytes, starting at the `%`: between one and three bytes.
    pub fn fragment(&self) -> &[u8] {
        &self.fragment[..self.len as usize]
    }

    /// Position of the `%` in the raw query.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid URL escape \"{}\" at offset {}",
            self.fragment().escape_ascii(),
            self.offset
        )
    }
}

impl core::error::Error for EscapeError {}

/// A type query values can't be decoded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The destination of a decode is not a struct.
    NotAStruct {
        /// name of the destination type
        type_name: &'static str,
    },

    /// A key resolved to a field of a kind that has no text form, such as
    /// a nested struct or a sequence.
    UnsupportedKind {
        /// wire name of the field
        key: &'static str,
        /// name of the field's type
        type_name: &'static str,
    },

    /// A key resolved to an empty `Option` whose contents can't be created,
    /// such as `Option<Box<dyn UnmarshalText>>`.
    Uninstantiable {
        /// wire name of the field
        key: &'static str,
        /// name of the type that has no default value
        type_name: &'static str,
    },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::NotAStruct { type_name } => {
                write!(f, "can't decode a query into {type_name}: not a struct")
            }
            TypeError::UnsupportedKind { key, type_name } => {
                write!(f, "field \"{key}\": can't decode into {type_name} type")
            }
            TypeError::Uninstantiable { key, type_name } => {
                write!(
                    f,
                    "field \"{key}\": can't decode into interface type {type_name}"
                )
            }
        }
    }
}

impl core::error::Error for TypeError {}

/// A value that doesn't convert to its field's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// wire name of the field
    pub key: &'static str,
    /// what went wrong
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for \"{}\": {}", self.key, self.kind)
    }
}

impl core::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.kind.source()
    }
}

/// Why a value didn't convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// not a base-10 integer that fits the field
    Int(ParseIntError),
    /// not a decimal or scientific float
    Float(ParseFloatError),
    /// a finite number too large for the field's float type
    FloatOutOfRange,
    /// the bytes are not UTF-8
    InvalidUtf8(Utf8Error),
}

impl ParseErrorKind {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ParseErrorKind::Int(e) => Some(e),
            ParseErrorKind::Float(e) => Some(e),
            ParseErrorKind::FloatOutOfRange => None,
            ParseErrorKind::InvalidUtf8(e) => Some(e),
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Int(e) => write!(f, "{e}"),
            ParseErrorKind::Float(e) => write!(f, "{e}"),
            ParseErrorKind::FloatOutOfRange => write!(f, "value out of range"),
            ParseErrorKind::InvalidUtf8(e) => write!(f, "{e}"),
        }
    }
}
