use alloc::vec::Vec;

use crate::spez::default_in_place;
use crate::*;

// Repeated keys are not collected: a sequence is something the decoder
// reports as unsupported rather than silently ignores.
unsafe impl<T: 'static> Shaped for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            default_in_place: Some(default_in_place::<Self> as DefaultInPlaceFn),
            def: Def::Opaque,
        }
    };
}
