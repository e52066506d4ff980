//! Detects, at compile time, whether a concrete type implements `Default`.
//!
//! `#[derive(Shaped)]` cannot see the impls of the type it is applied to, so
//! it emits `<SpezEmpty<Self>>::DEFAULT_IN_PLACE` with [`NoDefaultInPlace`]
//! in scope. Inherent associated items are preferred over trait ones, but
//! only apply when their bounds hold: the path resolves to `Some(..)` for
//! types with a `Default` impl and falls back to the trait's `None` for the
//! rest. This only works for concrete types.

use core::marker::PhantomData;

use crate::{DefaultInPlaceFn, PtrMut};

/// Carrier type for the detection, never constructed.
pub struct SpezEmpty<T>(PhantomData<T>);

impl<T: Default> SpezEmpty<T> {
    /// `Some` when `T: Default`.
    pub const DEFAULT_IN_PLACE: Option<DefaultInPlaceFn> =
        Some(default_in_place::<T> as DefaultInPlaceFn);
}

/// Fallback for types without a `Default` impl.
pub trait NoDefaultInPlace {
    /// Always `None`.
    const DEFAULT_IN_PLACE: Option<DefaultInPlaceFn> = None;
}

impl<T> NoDefaultInPlace for SpezEmpty<T> {}

/// Writes `T::default()` into `target`.
///
/// # Safety
///
/// `target` must be valid for writes of a `T` and properly aligned.
pub unsafe fn default_in_place<T: Default>(target: PtrMut<'_>) -> PtrMut<'_> {
    unsafe { target.write(T::default()) }
}
