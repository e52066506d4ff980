use core::fmt;

use crate::Shape;

/// Describes a field in a struct
#[derive(Clone, Copy)]
pub struct Field {
    /// name of the field as declared in the source (`r#` prefix removed)
    pub name: &'static str,

    /// shape of the inner type
    ///
    /// the layer of indirection allows for cyclic type definitions
    pub shape: fn() -> &'static Shape,

    /// offset of the field in the struct (obtained through `core::mem::offset_of`)
    pub offset: usize,

    /// flags derived from the declaration
    pub flags: FieldFlags,

    /// `#[url(...)]` and `#[serde(...)]` arguments, in declaration order
    pub attributes: &'static [FieldAttribute],
}

impl Field {
    /// Returns the shape of the inner type
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Returns true if the field was marked `#[url(flatten)]` or `#[serde(flatten)]`.
    #[inline]
    pub fn is_flattened(&self) -> bool {
        self.flags.contains(FieldFlags::FLATTEN)
    }

    /// Returns true if the field was declared without any `pub` qualifier.
    #[inline]
    pub fn is_private(&self) -> bool {
        self.flags.contains(FieldFlags::PRIVATE)
    }

    /// Gets the first attribute with the given namespace and key.
    pub fn get_attr(&self, ns: AttrNamespace, key: &str) -> Option<&'static FieldAttribute> {
        self.attributes
            .iter()
            .find(|attr| attr.ns == ns && attr.key == key)
    }

    /// Checks whether the field has an attribute with the given namespace and key.
    #[inline]
    pub fn has_attr(&self, ns: AttrNamespace, key: &str) -> bool {
        self.get_attr(ns, key).is_some()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &self.shape().type_name())
            .field("offset", &self.offset)
            .field("flags", &self.flags)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Bit flags for field-level properties known at derive time.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// The field's own fields are promoted into the enclosing struct.
    pub const FLATTEN: Self = Self(1 << 0);

    /// The field was declared without any visibility qualifier.
    ///
    /// Restricted visibility (`pub(crate)`, `pub(super)`, `pub(in path)`)
    /// counts as public: such fields are addressable from a query like
    /// plain `pub` ones. Only fields with no `pub` at all are hidden, unless
    /// they are flattened.
    pub const PRIVATE: Self = Self(1 << 1);

    /// An empty set of flags.
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the union of `self` and `other`.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if all flags in `other` are contained in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if no flags are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        if self.contains(Self::FLATTEN) {
            set.entry(&"FLATTEN");
        }
        if self.contains(Self::PRIVATE) {
            set.entry(&"PRIVATE");
        }
        set.finish()
    }
}

/// Which attribute an argument was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrNamespace {
    /// `#[url(...)]`, consulted first
    Url,
    /// `#[serde(...)]`, consulted when `#[url(...)]` says nothing
    Serde,
}

/// One argument of a field attribute: `key` or `key = "value"`.
///
/// `#[url(rename = "id", omitempty)]` yields two of these. Arguments the
/// decoder does not interpret are kept so that they remain visible through
/// reflection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldAttribute {
    /// attribute the argument came from
    pub ns: AttrNamespace,
    /// argument name
    pub key: &'static str,
    /// string literal after `=`, if any
    pub value: Option<&'static str>,
}

impl FieldAttribute {
    /// A `#[url(key = "value")]` or `#[url(key)]` argument.
    pub const fn url(key: &'static str, value: Option<&'static str>) -> Self {
        Self {
            ns: AttrNamespace::Url,
            key,
            value,
        }
    }

    /// A `#[serde(key = "value")]` or `#[serde(key)]` argument.
    pub const fn serde(key: &'static str, value: Option<&'static str>) -> Self {
        Self {
            ns: AttrNamespace::Serde,
            key,
            value,
        }
    }
}
