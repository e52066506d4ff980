use alloc::boxed::Box;

use crate::*;

unsafe impl<T: Shaped> Shaped for Box<T> {
    const SHAPE: &'static Shape = &const {
        unsafe fn borrow_mut<T: Shaped>(pointer: PtrMut<'_>) -> PtrMut<'_> {
            let boxed = unsafe { pointer.as_mut::<Box<T>>() };
            PtrMut::new(&mut **boxed)
        }

        unsafe fn default_in_place<T: Shaped>(target: PtrMut<'_>) -> PtrMut<'_> {
            let Some(default) = T::SHAPE.default_in_place else {
                unreachable!("only installed when the pointee has a default")
            };
            let mut boxed = Box::<T>::new_uninit();
            unsafe { default(PtrMut::from_uninit(&mut *boxed)) };
            let boxed = unsafe { boxed.assume_init() };
            unsafe { target.write(boxed) }
        }

        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            default_in_place: if T::SHAPE.default_in_place.is_some() {
                Some(default_in_place::<T> as DefaultInPlaceFn)
            } else {
                None
            },
            def: Def::Pointer(PointerDef {
                pointee: shape_of::<T>,
                borrow_mut: borrow_mut::<T>,
            }),
        }
    };
}

unsafe impl Shaped for Box<dyn UnmarshalText> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: || "Box<dyn UnmarshalText>",
            // there is no concrete type to allocate
            default_in_place: None,
            def: Def::Text(TextDef {
                unmarshal: unmarshal_text_in_place::<Box<dyn UnmarshalText>>,
            }),
        }
    };
}
