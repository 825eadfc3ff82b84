use super::*;

/// Memoize a function.
pub fn expand(mut func: syn::ItemFn) -> Result<proc_macro2::TokenStream> {
    if let Some(asyncness) = &func.sig.asyncness {
        bail!(asyncness, "async functions are not supported");
    }

    let mut args = vec![];
    let mut types = vec![];
    for input in &func.sig.inputs {
        let typed = match input {
            syn::FnArg::Typed(typed) => typed,
            syn::FnArg::Receiver(_) => {
                bail!(input, "methods are not supported")
            }
        };

        let name = match typed.pat.as_ref() {
            syn::Pat::Ident(syn::PatIdent {
                by_ref: None,
                mutability: None,
                ident,
                subpat: None,
                ..
            }) => ident,
            pat => bail!(pat, "only simple identifiers are supported"),
        };

        let ty = typed.ty.as_ref();
        match ty {
            syn::Type::Reference(_) => {
                bail!(ty, "arguments are cached by value, references are not supported")
            }
            syn::Type::ImplTrait(_) => {
                bail!(ty, "impl Trait arguments are not supported")
            }
            _ => {}
        }

        args.push(name);
        types.push(ty);
    }

    // Construct a tuple from all arguments.
    let arg_tuple = quote! { (#(#args,)*) };

    // Construct assertions that the arguments fulfill the necessary bounds.
    let bounds = types.iter().map(|ty| {
        quote! {
            ::fixmemo::internal::assert_hashable::<#ty>()
        }
    });

    // Construct the inner closure.
    let body = &func.block;
    let closure = quote! { |#arg_tuple| #body };

    // Only successes of fallible functions are cached.
    let entry = if returns_result(&func.sig.output) {
        quote! { memoized_fallible }
    } else {
        quote! { memoized }
    };

    // Adjust the function's body.
    func.block = parse_quote! { {
        #(#bounds;)*
        ::fixmemo::internal::#entry(#arg_tuple, #closure)
    } };

    Ok(quote! { #func })
}

/// Whether the return type is spelled as some `Result`.
fn returns_result(output: &syn::ReturnType) -> bool {
    let syn::ReturnType::Type(_, ty) = output else {
        return false;
    };
    let syn::Type::Path(path) = ty.as_ref() else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result")
}
