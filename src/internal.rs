use std::hash::Hash;

use crate::args::Args;
use crate::poly::PolyCache;

thread_local! {
    /// The caches of all `#[memoize]` functions on this thread.
    ///
    /// There is one cache per function and instantiation. They are never
    /// cleared and live until the thread exits.
    static CACHES: PolyCache = PolyCache::new();
}

/// Ensure a type is suitable as an argument.
pub fn assert_hashable<T: Hash + Eq + Clone + 'static>() {}

/// Execute a memoized function or use a cached result for it.
pub fn memoized<A, O, F>(args: A, func: F) -> O
where
    A: Args + 'static,
    O: Clone + 'static,
    F: FnOnce(A) -> O + 'static,
{
    CACHES.with(|caches| caches.get_or_compute(args, func))
}

/// Execute a fallible memoized function or use a cached success for it.
pub fn memoized_fallible<A, T, E, F>(args: A, func: F) -> Result<T, E>
where
    A: Args + 'static,
    T: Clone + 'static,
    F: FnOnce(A) -> Result<T, E> + 'static,
{
    CACHES.with(|caches| caches.try_get_or_compute(args, func))
}
