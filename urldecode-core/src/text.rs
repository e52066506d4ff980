use alloc::boxed::Box;

use crate::PtrMut;

/// Error returned by a custom text decoder. Surfaces unchanged to the caller
/// of the decode.
pub type TextError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A type that decodes itself from a query value.
///
/// A field whose type implements this (and is marked `#[url(text)]` on its
/// container, or is a `Box<dyn UnmarshalText>`) receives the unescaped value
/// bytes verbatim. This takes precedence over every built-in conversion.
pub trait UnmarshalText {
    /// Replaces the contents of `self` with what `text` describes.
    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), TextError>;
}

impl<T: UnmarshalText + ?Sized> UnmarshalText for Box<T> {
    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), TextError> {
        (**self).unmarshal_text(text)
    }
}

/// Type-erased entry point for [`UnmarshalText`], stored in a
/// [`TextDef`](crate::TextDef).
///
/// # Safety
///
/// `target` must point to an initialized `T`.
pub unsafe fn unmarshal_text_in_place<T: UnmarshalText>(
    target: PtrMut<'_>,
    text: &[u8],
) -> Result<(), TextError> {
    unsafe { target.as_mut::<T>() }.unmarshal_text(text)
}
