use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::args::{Apply, Args};
use crate::cache::MemoCache;
use crate::hash::{Combine, DefaultCombiner};
use crate::observe::Observer;

/// How a computation's output splits into a cacheable value and a failure.
///
/// [`Total`] computations always succeed and cache their whole output.
/// [`Partial`] computations return a `Result` and only their `Ok` values are
/// cached.
pub trait Mode<O> {
    /// The part of the output that is stored.
    type Value: Clone;
    /// The part of the output that is passed through but never stored.
    type Error;

    /// Separate an output into a value or a failure.
    fn split(output: O) -> Result<Self::Value, Self::Error>;

    /// Reassemble an output from a value or a failure.
    fn join(result: Result<Self::Value, Self::Error>) -> O;
}

/// Computations that cannot fail.
#[derive(Debug)]
pub enum Total {}

/// Computations that return a `Result`.
#[derive(Debug)]
pub enum Partial {}

impl<O: Clone> Mode<O> for Total {
    type Value = O;
    type Error = Infallible;

    #[inline]
    fn split(output: O) -> Result<O, Infallible> {
        Ok(output)
    }

    #[inline]
    fn join(result: Result<O, Infallible>) -> O {
        match result {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }
}

impl<T: Clone, E> Mode<Result<T, E>> for Partial {
    type Value = T;
    type Error = E;

    #[inline]
    fn split(output: Result<T, E>) -> Result<T, E> {
        output
    }

    #[inline]
    fn join(result: Result<T, E>) -> Result<T, E> {
        result
    }
}

/// A memoized plain function.
///
/// Wraps a function `(A0, .., An) -> O` together with a cache keyed on its
/// argument tuple. Recursive calls the function makes to itself bypass the
/// cache; use [`FixMemo`](crate::FixMemo) for recursion.
///
/// Each instantiation owns a separate cache, so `Memo`s over `(i32, i32)` and
/// `(u32, i32)` never share results even when the values are numerically
/// equal.
///
/// # Duplicates
/// Cloning a `Memo` shares its cache: results computed through one clone are
/// hits for all others. [`fork`](Self::fork) instead copies the current
/// entries into an independent cache.
///
/// # Example
/// ```
/// use fixmemo::Memo;
///
/// let add = Memo::new(|a: i32, b: i32| a + b);
/// assert_eq!(add.call((2, 3)), 5);
/// assert_eq!(add.call((2, 3)), 5);
/// assert_eq!(add.cache().len(), 1);
/// ```
pub struct Memo<A, O, F, M = Total, C = DefaultCombiner>
where
    M: Mode<O>,
{
    func: F,
    cache: Rc<MemoCache<A, M::Value, C>>,
}

impl<A, O, F> Memo<A, O, F>
where
    A: Args,
    O: Clone,
    F: Apply<A, O>,
{
    /// Wrap a function whose every output is cached.
    pub fn new(func: F) -> Self {
        Self { func, cache: Rc::new(MemoCache::new()) }
    }
}

impl<A, T, E, F> Memo<A, Result<T, E>, F, Partial>
where
    A: Args,
    T: Clone,
    F: Apply<A, Result<T, E>>,
{
    /// Wrap a fallible function. Only successful results are cached.
    pub fn fallible(func: F) -> Self {
        Self { func, cache: Rc::new(MemoCache::new()) }
    }
}

impl<A, O, F, M, C> Memo<A, O, F, M, C>
where
    A: Args,
    F: Apply<A, O>,
    M: Mode<O>,
    C: Combine,
{
    /// Call the function or use a cached result for these arguments.
    pub fn call(&self, args: A) -> O {
        let key = args.clone();
        let result = self
            .cache
            .try_get_or_compute(key, || M::split(self.func.apply(args)));
        M::join(result)
    }

    /// Replace the cache with an empty one using a different combiner.
    pub fn with_combiner<C2: Combine>(self, combiner: C2) -> Memo<A, O, F, M, C2> {
        Memo {
            func: self.func,
            cache: Rc::new(MemoCache::with_combiner(combiner)),
        }
    }

    /// Attach an observer to the cache.
    ///
    /// When the cache is shared with clones, they all report to it.
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
            func: self.func.clone(),
            cache: Rc::new(MemoCache::clone(&self.cache)),
        }
    }
}

impl<A, O, F, M, C> Clone for Memo<A, O, F, M, C>
where
    F: Clone,
    M: Mode<O>,
{
    fn clone(&self) -> Self {
        Self { func: self.func.clone(), cache: Rc::clone(&self.cache) }
    }
}

impl<A, O, F, M, C> Debug for Memo<A, O, F, M, C>
where
    M: Mode<O>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Memo").field("cache", &self.cache).finish_non_exhaustive()
    }
}
