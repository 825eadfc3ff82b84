extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("fixmemo: ", $fmt) $($tts)*)
        ))
    }
}

mod memoize;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_quote, Error, Result};

/// Memoize a pure function.
///
/// Arguments are cached by value, so they must be owned, hashable,
/// comparable and clonable. Each function (and each instantiation of a
/// generic one) gets its own cache on the current thread. Recursive calls go
/// through the memoized function and share that cache.
///
/// Functions returning `Result` only cache their `Ok` values.
///
/// ```ignore
/// #[fixmemo::memoize]
/// fn fib(n: u64) -> u64 {
///     if n < 2 { n } else { fib(n - 1) + fib(n - 2) }
/// }
/// ```
#[proc_macro_attribute]
pub fn memoize(_: TokenStream, stream: TokenStream) -> TokenStream {
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    memoize::expand(func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
