#![no_std]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

// Const type Id
mod typeid;
pub use typeid::*;

// Opaque pointer utilities
mod ptr;
pub use ptr::*;

// Shape descriptors
mod shape;
pub use shape::*;

mod field;
pub use field::*;

mod scalar;
pub use scalar::*;

// Custom decoding capability
mod text;
pub use text::*;

// `Default` detection for derived types
pub mod spez;

// Definitions for `core::` and `alloc::` types
mod impls;

/// Allows querying the [`Shape`] of a type, which is what the decoder reads to
/// find out where a query parameter goes and how to convert it.
///
/// # Safety
///
/// The decoder writes through raw pointers based on what the shape says. If
/// the shape lies about field offsets, field types or the kind of the type,
/// decoding is undefined behavior. Use `#[derive(Shaped)]`.
pub unsafe trait Shaped: 'static {
    /// The shape of this type
    const SHAPE: &'static Shape;
}

/// Returns the shape of `T`.
///
/// Field descriptors store this as a function pointer, which is what allows
/// a record to (indirectly) contain itself.
#[inline]
pub fn shape_of<T: Shaped>() -> &'static Shape {
    T::SHAPE
}
