use core::fmt;

use crate::{ConstTypeId, Field, PtrMut, ScalarType, TextError};

/// Schema for reflection of a type, the core type of this crate.
///
/// Contains everything the decoder needs to locate, allocate and write
/// values of the type.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Unique type identifier; two shapes describe the same type when their
    /// ids are equal.
    pub id: ConstTypeId,

    /// Returns the name of the type, for error messages.
    pub type_name: fn() -> &'static str,

    /// Writes a default value into uninitialized memory, if the type has
    /// one. `Option<T>` targets can only be allocated when `T` has one.
    pub default_in_place: Option<DefaultInPlaceFn>,

    /// What kind of type this is.
    pub def: Def,
}

/// Writes a default value of the shape's type into `target`.
///
/// # Safety
///
/// `target` must be valid for writes and aligned for the type. Whatever was
/// there is overwritten without being dropped.
pub type DefaultInPlaceFn = for<'mem> unsafe fn(target: PtrMut<'mem>) -> PtrMut<'mem>;

impl Shape {
    /// Returns the name of the type this shape describes.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Returns true if `self` and `other` describe the same type.
    #[inline]
    pub fn is_same(&self, other: &Shape) -> bool {
        self.id == other.id
    }

    /// Returns the struct definition, if this shape is a struct.
    #[inline]
    pub fn struct_def(&self) -> Option<&StructDef> {
        match &self.def {
            Def::Struct(def) => Some(def),
            _ => None,
        }
    }

    /// Looks through `Option` and `Box` layers for a struct.
    ///
    /// This is what makes `Option<Box<Inner>>` flattenable like `Inner`.
    pub fn indirect_struct(&'static self) -> Option<&'static Shape> {
        let mut shape = self;
        loop {
            match shape.def {
                Def::Struct(_) => return Some(shape),
                Def::Option(def) => shape = def.t(),
                Def::Pointer(def) => shape = def.pointee(),
                _ => return None,
            }
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Shape {}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name())
            .field("def", &self.def)
            .finish()
    }
}

/// The definition of a shape: what kind of type it is, and how to get at
/// its contents.
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// A primitive the decoder converts text into.
    Scalar(ScalarType),

    /// A struct with named fields.
    Struct(StructDef),

    /// `Option<T>`: decoding allocates `Some` in place.
    Option(OptionDef),

    /// `Box<T>`: decoding goes through the box.
    Pointer(PointerDef),

    /// A type that decodes itself from the raw value bytes.
    Text(TextDef),

    /// Anything else. Query strings cannot be decoded into it.
    Opaque,
}

/// Fields of a struct, in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// the fields
    pub fields: &'static [Field],
}

/// Returns a pointer to the value inside an `Option<T>`, storing
/// `Some(T::default())` first if it is `None`.
///
/// Returns `None` if the option is empty and `T` has no default value.
///
/// # Safety
///
/// `option` must point to an initialized `Option<T>` of the described type.
pub type OptionGetOrInitFn = for<'mem> unsafe fn(option: PtrMut<'mem>) -> Option<PtrMut<'mem>>;

/// Describes an `Option<T>`.
#[derive(Clone, Copy)]
pub struct OptionDef {
    /// Shape of `T`
    pub t: fn() -> &'static Shape,

    /// cf. [`OptionGetOrInitFn`]
    pub get_or_init: OptionGetOrInitFn,
}

impl OptionDef {
    /// Returns the shape of the wrapped type.
    #[inline]
    pub fn t(&self) -> &'static Shape {
        (self.t)()
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("t", &self.t().type_name())
            .finish_non_exhaustive()
    }
}

/// Returns a pointer to the value a smart pointer owns.
///
/// # Safety
///
/// `pointer` must point to an initialized value of the described type.
pub type BorrowMutFn = for<'mem> unsafe fn(pointer: PtrMut<'mem>) -> PtrMut<'mem>;

/// Describes an owning pointer such as `Box<T>`.
#[derive(Clone, Copy)]
pub struct PointerDef {
    /// Shape of the pointee
    pub pointee: fn() -> &'static Shape,

    /// cf. [`BorrowMutFn`]
    pub borrow_mut: BorrowMutFn,
}

impl PointerDef {
    /// Returns the shape of the pointee.
    #[inline]
    pub fn pointee(&self) -> &'static Shape {
        (self.pointee)()
    }
}

impl fmt::Debug for PointerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerDef")
            .field("pointee", &self.pointee().type_name())
            .finish_non_exhaustive()
    }
}

/// Hands the raw (already unescaped) value bytes to the type's own decoder.
///
/// # Safety
///
/// `target` must point to an initialized value of the described type.
pub type UnmarshalTextFn =
    for<'mem> unsafe fn(target: PtrMut<'mem>, text: &[u8]) -> Result<(), TextError>;

/// Describes a type decoded through [`UnmarshalText`](crate::UnmarshalText).
#[derive(Clone, Copy)]
pub struct TextDef {
    /// cf. [`UnmarshalTextFn`]
    pub unmarshal: UnmarshalTextFn,
}

impl fmt::Debug for TextDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDef").finish_non_exhaustive()
    }
}
