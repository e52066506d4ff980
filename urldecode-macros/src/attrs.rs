//! Parsing of `#[url(...)]` and `#[serde(...)]` arguments.

use proc_macro2::TokenStream as TokenStream2;
use unsynn::*;
// unsynn's glob brings a one-parameter `Result` alias
use core::result::Result;

operator! {
    Equals = "=";
}

unsynn! {
    /// `url(...)` or `serde(...)`, the inside of `#[...]`
    struct AttrCall {
        _name: Ident,
        args: ParenthesisGroupContaining<CommaDelimitedVec<AttrArg>>,
    }

    /// One argument of the call
    enum AttrArg {
        KeyValue(AttrKeyValue),
        Nested(AttrNested),
        Flag(Ident),
    }

    /// `key = "value"`
    struct AttrKeyValue {
        key: Ident,
        _eq: Equals,
        value: LiteralString,
    }

    /// `key(inner = "value", ...)`, as in `#[serde(rename(deserialize = "x"))]`
    struct AttrNested {
        key: Ident,
        group: ParenthesisGroupContaining<CommaDelimitedVec<AttrKeyValue>>,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Namespace {
    Url,
    Serde,
}

#[derive(Clone, Debug)]
pub(crate) struct Arg {
    pub ns: Namespace,
    pub key: String,
    pub value: Option<String>,
}

impl Arg {
    pub fn is(&self, ns: Namespace, key: &str) -> bool {
        self.ns == ns && self.key == key
    }
}

fn namespace_of(content: &TokenStream2) -> Option<Namespace> {
    match content.clone().into_iter().next() {
        Some(proc_macro2::TokenTree::Ident(ident)) if ident == "url" => Some(Namespace::Url),
        Some(proc_macro2::TokenTree::Ident(ident)) if ident == "serde" => Some(Namespace::Serde),
        _ => None,
    }
}

fn unquote(literal: &LiteralString) -> String {
    // LiteralString::value() includes the quotes
    literal.value().trim_matches('"').to_string()
}

/// Collects the arguments of every `#[url(...)]` and `#[serde(...)]`
/// attribute, given the bracket contents of each attribute in order.
///
/// A malformed `#[url(...)]` is an error. A `#[serde(...)]` this parser
/// can't read is left alone: serde reports its own mistakes.
pub(crate) fn parse_args(
    attributes: impl IntoIterator<Item = TokenStream2>,
) -> Result<Vec<Arg>, String> {
    let mut args = Vec::new();
    for content in attributes {
        let Some(ns) = namespace_of(&content) else {
            continue;
        };
        let mut iter = content.to_token_iter();
        let call = match iter.parse::<AttrCall>() {
            Ok(call) => call,
            Err(e) if ns == Namespace::Url => {
                return Err(format!("malformed #[url(...)] attribute: {e}"));
            }
            Err(_) => continue,
        };
        for arg in call.args.content.iter() {
            match &arg.value {
                AttrArg::KeyValue(kv) => args.push(Arg {
                    ns,
                    key: kv.key.to_string(),
                    value: Some(unquote(&kv.value)),
                }),
                AttrArg::Flag(flag) => args.push(Arg {
                    ns,
                    key: flag.to_string(),
                    value: None,
                }),
                AttrArg::Nested(nested) => match ns {
                    Namespace::Url => {
                        return Err(format!(
                            "#[url({}(...))] is not supported, use `{} = \"...\"`",
                            nested.key, nested.key
                        ));
                    }
                    Namespace::Serde => {
                        if nested.key != "rename" {
                            continue;
                        }
                        let deserialize = nested
                            .group
                            .content
                            .iter()
                            .find(|inner| inner.value.key == "deserialize");
                        if let Some(inner) = deserialize {
                            args.push(Arg {
                                ns,
                                key: "rename".to_string(),
                                value: Some(unquote(&inner.value.value)),
                            });
                        }
                    }
                },
            }
        }
    }
    Ok(args)
}

/// What the decoder needs to know about a field, derived from its arguments.
#[derive(Debug, Default)]
pub(crate) struct FieldOptions {
    pub excluded: bool,
    pub flatten: bool,
}

impl FieldOptions {
    pub fn from_args(args: &[Arg]) -> Self {
        let primary = args
            .iter()
            .find(|arg| arg.is(Namespace::Url, "rename"))
            .and_then(|arg| arg.value.as_deref());
        let fallback = args
            .iter()
            .find(|arg| arg.is(Namespace::Serde, "rename"))
            .and_then(|arg| arg.value.as_deref());
        let wire_name = primary.or(fallback);

        let skipped = args.iter().any(|arg| {
            arg.is(Namespace::Url, "skip")
                || arg.is(Namespace::Serde, "skip")
                || arg.is(Namespace::Serde, "skip_deserializing")
        });

        Self {
            excluded: skipped || wire_name == Some("-"),
            flatten: args
                .iter()
                .any(|arg| arg.key == "flatten" && arg.value.is_none()),
        }
    }
}
