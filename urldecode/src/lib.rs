#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

// The derive refers to `::urldecode::...`, including from within this crate.
extern crate self as urldecode;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub use urldecode_core::*;
pub use urldecode_macros::Shaped;

mod error;
pub use error::*;

mod escape;
pub use escape::{SCRATCH_LEN, unescape};

mod tokens;
pub use tokens::Tokens;

mod fields;
pub use fields::{EqualFn, FieldEntry, FieldTable, exact_match};

mod cache;
pub use cache::FieldCache;

mod value;

mod pool;
pub use pool::{DecoderBuffers, DecoderPool, PooledBuffers};

mod decoder;
pub use decoder::{Decoder, decode_bytes, decode_from, decode_str, from_bytes, from_str};
