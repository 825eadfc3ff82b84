use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::args::{Args, Generate};
use crate::cache::MemoCache;
use crate::hash::{Combine, DefaultCombiner};
use crate::memo::{Mode, Partial, Total};
use crate::observe::Observer;

/// A memoized self-recursive function.
///
/// The wrapped generator receives a [`Fix`] handle to this very memoizer as
/// its first parameter and issues its recursive calls through it instead of
/// calling itself. Every level of the recursion therefore goes through the
/// same cache.
///
/// Memoizers are only created through the named constructors
/// [`new`](Self::new) and [`fallible`](Self::fallible). A `FixMemo` is not a
/// function itself, so it can never be mistaken for a generator to wrap.
///
/// Cloning shares the cache; [`fork`](Self::fork) copies it.
///
/// # Example
/// ```
/// use fixmemo::{Fix, FixMemo};
///
/// fn fib(fib: &Fix<(u64,), u64>, n: u64) -> u64 {
///     if n < 2 { n } else { fib.call((n - 1,)) + fib.call((n - 2,)) }
/// }
///
/// let fib = FixMemo::new(fib);
/// assert_eq!(fib.call((90,)), 2880067194370816120);
/// ```
pub struct FixMemo<A, O, F, M = Total, C = DefaultCombiner>
where
    M: Mode<O>,
{
    base: F,
    cache: Rc<MemoCache<A, M::Value, C>>,
}

impl<A, O, F> FixMemo<A, O, F>
where
    A: Args,
    O: Clone,
    F: Generate<A, O>,
{
    /// Wrap a generator whose every output is cached.
    pub fn new(base: F) -> Self {
        Self { base, cache: Rc::new(MemoCache::new()) }
    }
}

impl<A, T, E, F> FixMemo<A, Result<T, E>, F, Partial>
where
    A: Args,
    T: Clone,
    F: Generate<A, Result<T, E>>,
{
    /// Wrap a fallible generator. Only successful results are cached.
    ///
    /// A failure anywhere in the recursion leaves no entry for the keys
    /// whose computation it aborted.
    pub fn fallible(base: F) -> Self {
        Self { base, cache: Rc::new(MemoCache::new()) }
    }
}

impl<A, O, F, M, C> FixMemo<A, O, F, M, C>
where
    A: Args,
    F: Generate<A, O>,
    M: Mode<O>,
    C: Combine,
{
    /// Call the generator or use a cached result for these arguments.
    pub fn call(&self, args: A) -> O {
        let key = args.clone();
        let this = Fix { inner: self };
        let result = self
            .cache
            .try_get_or_compute(key, || M::split(self.base.generate(&this, args)));
        M::join(result)
    }

    /// Replace the cache with an empty one using a different combiner.
    pub fn with_combiner<C2: Combine>(self, combiner: C2) -> FixMemo<A, O, F, M, C2> {
        FixMemo {
            base: self.base,
            cache: Rc::new(MemoCache::with_combiner(combiner)),
        }
    }

    /// Attach an observer to the cache.
    pub fn observe(self, observer: impl Observer<A> + 'static) -> Self {
        self.cache.set_observer(observer);
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &MemoCache<A, M::Value, C> {
        &self.cache
    }

    /// Duplicate this memoizer with an independent copy of its cache.
    pub fn fork(&self) -> Self
    where
        F: Clone,
        C: Clone,
    {
        Self {
            base: self.base.clone(),
            cache: Rc::new(MemoCache::clone(&self.cache)),
        }
    }
}

impl<A, O, F, M, C> Clone for FixMemo<A, O, F, M, C>
where
    F: Clone,
    M: Mode<O>,
{
    fn clone(&self) -> Self {
        Self { base: self.base.clone(), cache: Rc::clone(&self.cache) }
    }
}

impl<A, O, F, M, C> Debug for FixMemo<A, O, F, M, C>
where
    M: Mode<O>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FixMemo").field("cache", &self.cache).finish_non_exhaustive()
    }
}

/// A handle through which a generator calls its own memoized form.
///
/// The handle borrows the [`FixMemo`] that is currently running the
/// generator. It erases the generator's type, so a generator's signature
/// never has to mention itself.
pub struct Fix<'a, A, O> {
    inner: &'a dyn Reenter<A, O>,
}

impl<A, O> Fix<'_, A, O> {
    /// Make a memoized recursive call.
    #[inline]
    pub fn call(&self, args: A) -> O {
        self.inner.reenter(args)
    }
}

impl<A, O> Copy for Fix<'_, A, O> {}

impl<A, O> Clone for Fix<'_, A, O> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, O> Debug for Fix<'_, A, O> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad("Fix(..)")
    }
}

/// Re-entry into a running fixed-point memoizer.
trait Reenter<A, O> {
    fn reenter(&self, args: A) -> O;
}

impl<A, O, F, M, C> Reenter<A, O> for FixMemo<A, O, F, M, C>
where
    A: Args,
    F: Generate<A, O>,
    M: Mode<O>,
    C: Combine,
{
    fn reenter(&self, args: A) -> O {
        self.call(args)
    }
}
