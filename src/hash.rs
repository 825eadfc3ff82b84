use std::hash::BuildHasher;

use rustc_hash::FxBuildHasher;
use siphasher::sip128::{Hasher128, SipHasher13};

use crate::args::Args;

/// The combiner caches use unless told otherwise.
pub type DefaultCombiner = Fold;

/// Hashes a whole argument tuple.
///
/// Caches only depend on this capability, so any strategy can be swapped in
/// without touching the cache or the memoizers. Equal tuples must produce
/// equal hashes. Unequal tuples may collide; caches always compare keys in
/// full before returning a stored result.
pub trait Combine {
    /// Produce the composite hash of an argument tuple.
    fn combine<A: Args>(&self, args: &A) -> u64;
}

/// Mix one elementary hash into a running seed.
///
/// The mix is order-sensitive: `mix(mix(0, a), b)` and `mix(mix(0, b), a)`
/// generally differ.
#[inline]
pub fn hash_combine(seed: u64, hash: u64) -> u64 {
    seed ^ hash
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Folds per-element hashes left to right, starting from a zero seed.
///
/// Elementary hashes come from `S`. The default, `FxBuildHasher`, is
/// deterministic across runs, so the composite hash is too.
#[derive(Debug, Default, Copy, Clone)]
pub struct Fold<S = FxBuildHasher> {
    build: S,
}

impl Fold {
    /// Fold with `FxBuildHasher`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> Fold<S> {
    /// Use a custom hasher for the elements.
    pub fn with_hasher(build: S) -> Self {
        Self { build }
    }
}

impl<S: BuildHasher> Combine for Fold<S> {
    #[inline]
    fn combine<A: Args>(&self, args: &A) -> u64 {
        args.fold_hashes(&self.build, 0, hash_combine)
    }
}

/// Streams the whole tuple through 128-bit SipHash-1-3.
#[derive(Debug, Default, Copy, Clone)]
pub struct Sip;

impl Combine for Sip {
    #[inline]
    fn combine<A: Args>(&self, args: &A) -> u64 {
        let mut state = SipHasher13::new();
        args.hash(&mut state);
        let hash = state.finish128().as_u128();
        (hash >> 64) as u64 ^ hash as u64
    }
}
