use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::args::Args;
use crate::cache::MemoCache;

/// A family of caches, one per computation type signature.
///
/// A generic computation instantiated at different argument types gets a
/// separate, independent cache for every instantiation: results for
/// `(i32, i32)` are never hits for `(u32, i32)`. The computation's own type
/// is part of the signature, so distinct closures and fn items never share
/// a cache either. Function pointers of the same type do share one, so pass
/// closures or fn items.
///
/// Caches are created on first use and live as long as the family. The
/// family is owned by the caller; the `#[memoize]` attribute uses one
/// family per thread that lives until the thread exits.
///
/// # Example
/// ```
/// use fixmemo::PolyCache;
///
/// fn add<T: std::ops::Add<Output = T>>((a, b): (T, T)) -> T {
///     a + b
/// }
///
/// let caches = PolyCache::new();
/// assert_eq!(caches.get_or_compute((2i32, 3i32), add), 5);
/// assert_eq!(caches.get_or_compute((2u32, 3u32), add), 5);
/// assert_eq!(caches.len(), 2);
/// ```
#[derive(Default)]
pub struct PolyCache {
    /// Maps from signatures to `Rc<MemoCache<A, V>>`.
    caches: RefCell<FxHashMap<TypeId, Rc<dyn Any>>>,
}

impl PolyCache {
    /// Create an empty family.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `func` or use the result cached for its signature and `args`.
    pub fn get_or_compute<A, O, F>(&self, args: A, func: F) -> O
    where
        A: Args + 'static,
        O: Clone + 'static,
        F: FnOnce(A) -> O + 'static,
    {
        let cache = self.cache_of::<F, A, O>();
        let key = args.clone();
        cache.get_or_compute(key, || func(args))
    }

    /// Call the fallible `func` or use the result cached for its signature
    /// and `args`. Failures are not cached.
    pub fn try_get_or_compute<A, T, E, F>(&self, args: A, func: F) -> Result<T, E>
    where
        A: Args + 'static,
        T: Clone + 'static,
        F: FnOnce(A) -> Result<T, E> + 'static,
    {
        let cache = self.cache_of::<F, A, T>();
        let key = args.clone();
        cache.try_get_or_compute(key, || func(args))
    }

    /// The cache for signature `S` with keys `A` and values `V`.
    ///
    /// The returned handle stays valid even while nested computations add
    /// further signatures to the family.
    pub fn cache_of<S, A, V>(&self) -> Rc<MemoCache<A, V>>
    where
        S: ?Sized + 'static,
        A: Args + 'static,
        V: Clone + 'static,
    {
        let id = TypeId::of::<(fn() -> Box<S>, A, V)>();
        let erased = Rc::clone(
            self.caches
                .borrow_mut()
                .entry(id)
                .or_insert_with(|| Rc::new(MemoCache::<A, V>::new())),
        );
        erased.downcast().expect("wrong cache type")
    }

    /// The number of signatures seen so far.
    pub fn len(&self) -> usize {
        self.caches.borrow().len()
    }

    /// Whether no signature has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for PolyCache {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("PolyCache").field("signatures", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ops::Add;

    use super::*;

    fn add<T: Add<Output = T>>((a, b): (T, T)) -> T {
        a + b
    }

    #[test]
    fn test_signatures_are_independent() {
        let caches = PolyCache::new();
        assert_eq!(caches.get_or_compute((2i32, 3i32), add), 5);
        assert_eq!(caches.get_or_compute((2i64, 3i64), add), 5);
        assert_eq!(caches.len(), 2);

        let ints = caches.cache_of::<fn((i32, i32)) -> i32, (i32, i32), i32>();
        assert!(ints.is_empty());
        assert_eq!(caches.len(), 3);
    }

    #[test]
    fn test_same_closure_shares_cache() {
        let caches = PolyCache::new();
        let runs = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let runs = runs.clone();
            let value = caches.get_or_compute((7u8,), move |(x,)| {
                runs.set(runs.get() + 1);
                x as u32 * 3
            });
            assert_eq!(value, 21);
        }
        assert_eq!(runs.get(), 1);
        assert_eq!(caches.len(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let caches = PolyCache::new();
        let half = |(x,): (u32,)| if x % 2 == 0 { Ok(x / 2) } else { Err(x) };
        assert_eq!(caches.try_get_or_compute((3,), half), Err(3));
        assert_eq!(caches.try_get_or_compute((4,), half), Ok(2));
        assert_eq!(caches.len(), 1);
    }
}
