//! `#[urldecode_testhelpers::test]`, a `#[test]` that sets up tracing first.

use quote::quote;
use unsynn::*;

unsynn! {
    /// A function item: everything up to the body, then the body.
    struct TestFn {
        signature: Vec<Cons<Except<BraceGroup>, TokenTree>>,
        body: BraceGroup,
    }
}

/// Marks a test and installs the tracing subscriber before its body runs.
///
/// ```ignore
/// #[urldecode_testhelpers::test]
/// fn decodes_things() {
///     // `URLDECODE_LOG=trace` shows what the decoder did
/// }
/// ```
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let test_fn = match iter.parse::<TestFn>() {
        Ok(test_fn) => test_fn,
        Err(e) => {
            let msg = e.to_string();
            return quote! { compile_error!(#msg); }.into();
        }
    };

    let signature = test_fn.signature.iter().map(|tt| &tt.second);
    let body = test_fn.body.0.stream();

    quote! {
        #[::core::prelude::rust_2024::test]
        #(#signature)* {
            ::urldecode_testhelpers::setup();

            #body
        }
    }
    .into()
}
