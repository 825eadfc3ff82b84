//! Memoization of plain and self-recursive functions.
//!
//! - [`Memo`] wraps a function of up to twelve parameters and caches its
//!   results by argument tuple.
//! - [`FixMemo`] wraps a generator that receives a [`Fix`] handle to its own
//!   memoized form, so every level of a recursion shares one cache.
//! - [`MemoCache`] is the get-or-compute cache underneath both. Keys are
//!   hashed by a pluggable [`Combine`] strategy.
//! - [`PolyCache`] keeps one cache per computation type signature.
//! - `#[memoize]` memoizes a free function through a thread-local
//!   [`PolyCache`].
//!
//! Computations must be referentially transparent: a hit returns the stored
//! result without running anything. Failures of fallible computations are
//! passed through and never stored.
//!
//! ```
//! use fixmemo::{Fix, FixMemo, Memo};
//!
//! let add = Memo::new(|a: i32, b: i32| a + b);
//! assert_eq!(add.call((2, 3)), 5);
//!
//! let fib = FixMemo::new(|fib: &Fix<(u32,), u64>, n: u32| {
//!     if n < 2 { n as u64 } else { fib.call((n - 1,)) + fib.call((n - 2,)) }
//! });
//! assert_eq!(fib.call((10,)), 55);
//! ```

mod args;
mod cache;
mod fix;
mod hash;
mod memo;
mod observe;
mod passthroughhasher;
mod poly;
mod sync;

#[cfg(feature = "testing")]
pub mod testing;

pub use crate::args::{Apply, Args, Generate};
pub use crate::cache::MemoCache;
pub use crate::fix::{Fix, FixMemo};
pub use crate::hash::{hash_combine, Combine, DefaultCombiner, Fold, Sip};
pub use crate::memo::{Memo, Mode, Partial, Total};
#[cfg(feature = "tracing")]
pub use crate::observe::Trace;
pub use crate::observe::{Event, Observer};
pub use crate::poly::PolyCache;
pub use crate::sync::SyncMemoCache;

#[cfg(feature = "macros")]
pub use fixmemo_macros::memoize;

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal;
