#![doc = include_str!("../README.md")]

mod attrs;
mod process_struct;

/// Registers a struct's fields so that query strings can be decoded into it.
///
/// Field attributes:
///
/// * `#[url(rename = "name")]` sets the wire name. A wire name of `-`
///   excludes the field.
/// * `#[url(skip)]` excludes the field.
/// * `#[url(flatten)]` promotes the fields of a nested struct (also through
///   `Option` and `Box`) into this one.
/// * any other `#[url(key)]` or `#[url(key = "value")]` is recorded but
///   doesn't change decoding.
///
/// When a field has no `#[url(...)]` name, `#[serde(rename = "...")]`,
/// `#[serde(skip)]`, `#[serde(skip_deserializing)]` and `#[serde(flatten)]`
/// are honored, so types that already derive `Deserialize` decode the same
/// way.
///
/// The container attribute `#[url(text)]` makes the struct decode itself
/// through its `UnmarshalText` implementation instead.
#[proc_macro_derive(Shaped, attributes(url, serde))]
pub fn derive_shaped(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    process_struct::derive_shaped(input.into()).into()
}
