//! Standard types that already know how to parse themselves.

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use core::str::FromStr;

use crate::*;

unsafe fn from_str_in_place<T>(target: PtrMut<'_>, text: &[u8]) -> Result<(), TextError>
where
    T: FromStr,
    T::Err: core::error::Error + Send + Sync + 'static,
{
    let parsed = core::str::from_utf8(text)?.parse::<T>()?;
    *unsafe { target.as_mut::<T>() } = parsed;
    Ok(())
}

macro_rules! impl_shaped_from_str {
    ($($ty:ident),* $(,)?) => {
        $(
            unsafe impl Shaped for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape {
                        id: ConstTypeId::of::<$ty>(),
                        type_name: || stringify!($ty),
                        default_in_place: None,
                        def: Def::Text(TextDef {
                            unmarshal: from_str_in_place::<$ty>,
                        }),
                    }
                };
            }
        )*
    };
}

impl_shaped_from_str!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
