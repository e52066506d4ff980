//! Type-erased pointers used to reach into a value described by a [`Shape`](crate::Shape).

use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// A type-erased, thin, mutable pointer into a value being decoded.
///
/// The lifetime ties the pointer to the borrow it was created from, but
/// nothing else is checked: the caller is responsible for reading and writing
/// it as the type its shape describes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PtrMut<'mem> {
    ptr: NonNull<u8>,
    phantom: PhantomData<&'mem mut ()>,
}

impl fmt::Debug for PtrMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr, f)
    }
}

impl<'mem> PtrMut<'mem> {
    /// Creates a pointer to an initialized value.
    #[inline]
    pub fn new<T>(value: &'mem mut T) -> Self {
        Self {
            ptr: NonNull::from(value).cast(),
            phantom: PhantomData,
        }
    }

    /// Creates a pointer to memory that has yet to be initialized.
    #[inline]
    pub fn from_uninit<T>(slot: &'mem mut MaybeUninit<T>) -> Self {
        Self {
            ptr: NonNull::from(slot).cast(),
            phantom: PhantomData,
        }
    }

    /// Returns the underlying pointer.
    #[inline]
    pub fn as_byte_ptr(self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Returns a pointer to the field at `offset` bytes from this one.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of a field of the struct this pointer
    /// points to.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> Self {
        Self {
            // SAFETY: the caller guarantees the offset stays within the struct
            ptr: unsafe { self.ptr.add(offset) },
            phantom: PhantomData,
        }
    }

    /// Borrows the pointee as a `T`.
    ///
    /// # Safety
    ///
    /// The pointer must point to an initialized `T`, and no other reference
    /// to it may be alive for `'mem`.
    #[inline]
    pub unsafe fn as_mut<T>(self) -> &'mem mut T {
        unsafe { &mut *self.ptr.as_ptr().cast::<T>() }
    }

    /// Writes `value` into the pointee without dropping what was there.
    ///
    /// # Safety
    ///
    /// The pointer must be valid for writes of a `T` and properly aligned.
    #[inline]
    pub unsafe fn write<T>(self, value: T) -> Self {
        unsafe { self.ptr.as_ptr().cast::<T>().write(value) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct Pair {
        a: u8,
        b: u32,
    }

    #[test]
    fn field_offsets_reach_fields() {
        let mut pair = Pair { a: 1, b: 2 };
        let ptr = PtrMut::new(&mut pair);
        unsafe {
            *ptr.field(core::mem::offset_of!(Pair, b)).as_mut::<u32>() = 42;
            *ptr.field(core::mem::offset_of!(Pair, a)).as_mut::<u8>() = 7;
        }
        assert_eq!(pair.a, 7);
        assert_eq!(pair.b, 42);
    }

    #[test]
    fn write_initializes_uninit_memory() {
        let mut slot = MaybeUninit::<alloc::string::String>::uninit();
        unsafe { PtrMut::from_uninit(&mut slot).write(alloc::string::String::from("hi")) };
        let value = unsafe { slot.assume_init() };
        assert_eq!(value, "hi");
    }
}
