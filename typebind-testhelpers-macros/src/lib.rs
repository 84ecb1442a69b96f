//! The `#[test]` attribute used across typebind's test suites.

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    // attributes, visibility and qualifiers ahead of `fn`
    struct Preamble {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    // generics, parameters and return type ahead of the body
    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        preamble: Preamble,
        _fn: KFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

impl quote::ToTokens for Preamble {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

/// Runs `typebind_testhelpers::setup()` before the test body.
///
/// ```ignore
/// use typebind_testhelpers::test;
///
/// #[test]
/// fn decodes_lists() {
///     // TYPEBIND_LOG=typebind=trace shows adapter resolution
/// }
/// ```
///
/// Another test attribute can be named as the argument, for example
/// `#[typebind_testhelpers::test(tokio::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let TestFn {
        preamble,
        _fn,
        name,
        signature,
        body,
    } = match item.to_token_iter().parse::<TestFn>() {
        Ok(decl) => decl,
        Err(_) => {
            return quote::quote! { ::core::compile_error!("#[test] expects a function"); }
                .into();
        }
    };
    let body = body.0.stream();

    let test_attr = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };

    quote::quote! {
        #test_attr
        #preamble fn #name #signature {
            ::typebind_testhelpers::setup();
            #body
        }
    }
    .into()
}
