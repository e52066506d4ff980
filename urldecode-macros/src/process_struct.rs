//! Implementation of `#[derive(Shaped)]`.

use proc_macro2::{Literal, Spacing, TokenStream as TokenStream2};
use quote::quote;
use unsynn::*;
// unsynn's glob brings a one-parameter `Result` alias
use core::result::Result;

use crate::attrs::{Arg, FieldOptions, Namespace, parse_args};

keyword! {
    KStruct = "struct";
    KPub = "pub";
}

operator! {
    Less = "<";
}

unsynn! {
    /// Visibility: `pub`, `pub(...)` or nothing
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// An attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        content: BracketGroup,
    }

    /// The derive input, when it is a struct
    struct StructDef {
        attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        _kw_struct: KStruct,
        name: Ident,
        body: StructBody,
    }

    /// What follows the struct name
    enum StructBody {
        Named(BraceGroup),
        Unit(Semicolon),
        Tuple(ParenthesisGroup),
        Generic(Less),
    }

    /// One named field. The type is everything after the colon.
    struct FieldDef {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        ty: Vec<TokenTree>,
    }
}

fn attribute_contents(attrs: &[Attribute]) -> impl Iterator<Item = TokenStream2> + '_ {
    attrs.iter().map(|attr| attr.content.0.stream())
}

/// Splits the body of a struct into one token stream per field.
///
/// Commas inside generic arguments (`HashMap<K, V>`) don't separate fields;
/// groups are single token trees so parentheses and brackets need no care.
fn split_fields(body: TokenStream2) -> Vec<TokenStream2> {
    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut after_dash = false;

    for tt in body {
        if let TokenTree::Punct(punct) = &tt {
            match punct.as_char() {
                ',' if depth == 0 => {
                    if !current.is_empty() {
                        fields.push(current.drain(..).collect());
                    }
                    after_dash = false;
                    continue;
                }
                '<' => depth += 1,
                // `->` in a function pointer type
                '>' if !after_dash => depth = depth.saturating_sub(1),
                _ => {}
            }
            after_dash = punct.as_char() == '-' && punct.spacing() == Spacing::Joint;
        } else {
            after_dash = false;
        }
        current.push(tt);
    }
    if !current.is_empty() {
        fields.push(current.into_iter().collect());
    }
    fields
}

fn emit_attribute(arg: &Arg) -> TokenStream2 {
    let key = &arg.key;
    let value = match &arg.value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    };
    match arg.ns {
        Namespace::Url => quote! { ::urldecode::FieldAttribute::url(#key, #value) },
        Namespace::Serde => quote! { ::urldecode::FieldAttribute::serde(#key, #value) },
    }
}

/// Emits the `Field` for one field, or nothing if the field is left out.
fn emit_field(struct_name: &Ident, field: &FieldDef) -> Result<Option<TokenStream2>, String> {
    let args = parse_args(attribute_contents(&field.attrs))?;
    let options = FieldOptions::from_args(&args);
    // `pub(crate)`, `pub(super)` and `pub(in ..)` all count as public
    let private = field.vis.is_none();

    // Leaving these out means their types don't have to be `Shaped`.
    if options.excluded || (private && !options.flatten) {
        return Ok(None);
    }

    let ident = &field.name;
    let ident_str = ident.to_string();
    let name = ident_str.strip_prefix("r#").unwrap_or(&ident_str);
    let ty: TokenStream2 = field.ty.iter().cloned().collect();

    let mut flags = quote! { ::urldecode::FieldFlags::empty() };
    if options.flatten {
        flags = quote! { #flags.union(::urldecode::FieldFlags::FLATTEN) };
    }
    if private {
        flags = quote! { #flags.union(::urldecode::FieldFlags::PRIVATE) };
    }

    let attr_count = Literal::usize_unsuffixed(args.len());
    let attributes = args.iter().map(emit_attribute);

    Ok(Some(quote! {
        ::urldecode::Field {
            name: #name,
            shape: ::urldecode::shape_of::<#ty>,
            offset: ::core::mem::offset_of!(#struct_name, #ident),
            flags: #flags,
            attributes: &const {
                let attributes: [::urldecode::FieldAttribute; #attr_count] = [#(#attributes),*];
                attributes
            },
        }
    }))
}

fn process_struct(def: &StructDef) -> Result<TokenStream2, String> {
    let name = &def.name;
    let name_str = name.to_string();
    let name_str = name_str.strip_prefix("r#").unwrap_or(&name_str);

    let container_args = parse_args(attribute_contents(&def.attrs))?;
    let mut text = false;
    for arg in container_args.iter().filter(|arg| arg.ns == Namespace::Url) {
        match (arg.key.as_str(), &arg.value) {
            ("text", None) => text = true,
            _ => {
                return Err(format!(
                    "unknown container attribute `#[url({})]`, expected `#[url(text)]`",
                    arg.key
                ));
            }
        }
    }

    let fields = match &def.body {
        StructBody::Named(group) => split_fields(group.0.stream())
            .into_iter()
            .map(|tokens| {
                let mut iter = tokens.to_token_iter();
                let field = iter.parse::<FieldDef>().map_err(|e| e.to_string())?;
                emit_field(name, &field)
            })
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, String>>()?,
        StructBody::Unit(_) => Vec::new(),
        StructBody::Tuple(_) => {
            return Err(format!(
                "`{name_str}`: Shaped can only be derived for structs with named fields"
            ));
        }
        StructBody::Generic(_) => {
            return Err(format!(
                "`{name_str}`: Shaped can't be derived for generic structs"
            ));
        }
    };

    let def_tokens = if text {
        quote! {
            ::urldecode::Def::Text(::urldecode::TextDef {
                unmarshal: ::urldecode::unmarshal_text_in_place::<Self>,
            })
        }
    } else {
        let field_count = Literal::usize_unsuffixed(fields.len());
        quote! {
            ::urldecode::Def::Struct(::urldecode::StructDef {
                fields: &const {
                    let fields: [::urldecode::Field; #field_count] = [#(#fields),*];
                    fields
                },
            })
        }
    };

    Ok(quote! {
        #[automatically_derived]
        unsafe impl ::urldecode::Shaped for #name {
            const SHAPE: &'static ::urldecode::Shape = &const {
                ::urldecode::Shape {
                    id: ::urldecode::ConstTypeId::of::<Self>(),
                    type_name: || #name_str,
                    default_in_place: {
                        use ::urldecode::spez::NoDefaultInPlace as _;
                        <::urldecode::spez::SpezEmpty<Self>>::DEFAULT_IN_PLACE
                    },
                    def: #def_tokens,
                }
            };
        }
    })
}

pub(crate) fn derive_shaped(input: TokenStream2) -> TokenStream2 {
    let mut iter = input.to_token_iter();

    let parsed: StructDef = match iter.parse() {
        Ok(def) => def,
        Err(_) => {
            return quote! {
                compile_error!("Shaped can only be derived for structs with named fields");
            };
        }
    };

    match process_struct(&parsed) {
        Ok(tokens) => tokens,
        Err(err) => quote! { compile_error!(#err); },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: TokenStream2) -> String {
        derive_shaped(input).to_string()
    }

    #[test]
    fn splits_fields_outside_generic_arguments() {
        let fields = split_fields(quote! {
            pub a: HashMap<String, u32>,
            pub b: fn(u8, u8) -> Vec<u8>,
            c: u8,
        });
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn leaves_out_skipped_and_private_fields() {
        let out = expand(quote! {
            struct Query {
                pub kept: u32,
                #[url(skip)]
                pub skipped: NotShaped,
                hidden: NotShaped,
                #[url(flatten)]
                inner: Inner,
            }
        });
        assert!(out.contains("\"kept\""));
        assert!(out.contains("\"inner\""));
        assert!(!out.contains("NotShaped"));
        assert!(out.contains("PRIVATE"));
    }

    #[test]
    fn restricted_visibility_is_public() {
        let out = expand(quote! {
            struct Query {
                pub(crate) a: u8,
                pub(super) b: u8,
                pub(in crate::query) c: u8,
            }
        });
        assert!(out.contains("\"a\""));
        assert!(out.contains("\"b\""));
        assert!(out.contains("\"c\""));
        assert!(!out.contains("PRIVATE"));
    }

    #[test]
    fn strips_raw_identifier_prefix() {
        let out = expand(quote! {
            pub struct Query {
                pub r#type: String,
            }
        });
        assert!(out.contains("name : \"type\""));
    }

    #[test]
    fn rejects_what_it_cannot_describe() {
        assert!(expand(quote! { struct Pair(u32, u32); }).contains("compile_error"));
        assert!(expand(quote! { struct Wrap<T> { pub t: T } }).contains("compile_error"));
        assert!(expand(quote! { enum Kind { A, B } }).contains("compile_error"));
        assert!(expand(quote! { #[url(nope)] struct Q { pub a: u8 } }).contains("compile_error"));
    }
}
