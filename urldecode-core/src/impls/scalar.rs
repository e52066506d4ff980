use alloc::string::String;

use crate::spez::default_in_place;
use crate::*;

macro_rules! impl_shaped_for_scalar {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            unsafe impl Shaped for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape {
                        id: ConstTypeId::of::<$ty>(),
                        type_name: || stringify!($ty),
                        default_in_place: Some(default_in_place::<$ty> as DefaultInPlaceFn),
                        def: Def::Scalar(ScalarType::$scalar),
                    }
                };
            }
        )*
    };
}

impl_shaped_for_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => USize,
    f32 => F32,
    f64 => F64,
    String => String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_describe_themselves() {
        assert!(matches!(u16::SHAPE.def, Def::Scalar(ScalarType::U16)));
        assert!(matches!(String::SHAPE.def, Def::Scalar(ScalarType::String)));
        assert_eq!(f64::SHAPE.type_name(), "f64");
        assert!(i32::SHAPE.default_in_place.is_some());
        assert_ne!(i32::SHAPE, u32::SHAPE);
    }
}
