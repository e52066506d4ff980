mod boxed;
mod net;
mod option;
mod scalar;
mod vec;
