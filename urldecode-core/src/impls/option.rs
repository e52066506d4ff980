use core::mem::MaybeUninit;

use crate::spez::default_in_place;
use crate::*;

unsafe impl<T: Shaped> Shaped for Option<T> {
    const SHAPE: &'static Shape = &const {
        unsafe fn get_or_init<T: Shaped>(option: PtrMut<'_>) -> Option<PtrMut<'_>> {
            let option = unsafe { option.as_mut::<Option<T>>() };
            if option.is_none() {
                let default = T::SHAPE.default_in_place?;
                let mut slot = MaybeUninit::<T>::uninit();
                unsafe { default(PtrMut::from_uninit(&mut slot)) };
                *option = Some(unsafe { slot.assume_init() });
            }
            option.as_mut().map(PtrMut::new)
        }

        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            default_in_place: Some(default_in_place::<Self> as DefaultInPlaceFn),
            def: Def::Option(OptionDef {
                t: shape_of::<T>,
                get_or_init: get_or_init::<T>,
            }),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDefault;

    unsafe impl Shaped for NoDefault {
        const SHAPE: &'static Shape = &Shape {
            id: ConstTypeId::of::<NoDefault>(),
            type_name: || "NoDefault",
            default_in_place: None,
            def: Def::Opaque,
        };
    }

    fn option_def<T: Shaped>() -> OptionDef {
        match T::SHAPE.def {
            Def::Option(def) => def,
            _ => panic!("expected an option shape"),
        }
    }

    #[test]
    fn get_or_init_allocates_default() {
        let mut value: Option<u32> = None;
        let def = option_def::<Option<u32>>();
        let inner = unsafe { (def.get_or_init)(PtrMut::new(&mut value)) }.unwrap();
        unsafe { *inner.as_mut::<u32>() = 5 };
        assert_eq!(value, Some(5));
    }

    #[test]
    fn get_or_init_keeps_existing_value() {
        let mut value = Some(7u32);
        let def = option_def::<Option<u32>>();
        let inner = unsafe { (def.get_or_init)(PtrMut::new(&mut value)) }.unwrap();
        assert_eq!(unsafe { *inner.as_mut::<u32>() }, 7);
    }

    #[test]
    fn get_or_init_needs_a_default() {
        let mut value: Option<NoDefault> = None;
        let def = option_def::<Option<NoDefault>>();
        assert!(unsafe { (def.get_or_init)(PtrMut::new(&mut value)) }.is_none());
        assert!(value.is_none());
    }
}
