use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Identity of a shape, buildable in a `const`.
///
/// `TypeId::of` is not callable while a `SHAPE` constant is evaluated, so
/// this keeps the function that produces the id and calls it on comparison.
#[derive(Copy, Clone)]
pub struct ConstTypeId(fn() -> TypeId);

impl ConstTypeId {
    /// The id of `T`.
    #[must_use]
    pub const fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>)
    }

    /// The [`TypeId`] this stands for.
    #[inline]
    pub fn get(self) -> TypeId {
        (self.0)()
    }
}

impl fmt::Debug for ConstTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for ConstTypeId {}

// Hashes the id, not the function pointer: one type may get a distinct
// instance of `TypeId::of` per codegen unit.
impl Hash for ConstTypeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
