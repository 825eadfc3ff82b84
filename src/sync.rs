use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::args::Args;
use crate::cache::CacheData;
use crate::hash::{Combine, DefaultCombiner};
use crate::observe::{Event, Observer};

/// A thread-safe variant of [`MemoCache`](crate::MemoCache).
///
/// Lookups only take a read lock and computations run without holding any
/// lock, so they may use the cache themselves. Two threads that miss the
/// same key at the same time both compute it; the first result to arrive is
/// stored and the other one is dropped.
pub struct SyncMemoCache<A, V, C = DefaultCombiner> {
    data: RwLock<CacheData<A, V>>,
    combiner: C,
    observer: Option<Arc<dyn Observer<A> + Send + Sync>>,
}

impl<A: Args, V: Clone> SyncMemoCache<A, V> {
    /// Create an empty cache with the default combiner.
    pub fn new() -> Self {
        Self::with_combiner(DefaultCombiner::default())
    }
}

impl<A: Args, V: Clone, C: Combine> SyncMemoCache<A, V, C> {
    /// Create an empty cache that hashes keys with `combiner`.
    pub fn with_combiner(combiner: C) -> Self {
        Self {
            data: RwLock::new(CacheData::default()),
            combiner,
            observer: None,
        }
    }

    /// Attach an observer, replacing any previous one.
    pub fn observe(mut self, observer: impl Observer<A> + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Return the stored result for `key` or compute and store it.
    pub fn get_or_compute(&self, key: A, compute: impl FnOnce() -> V) -> V {
        match self.try_get_or_compute(key, || Ok::<_, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Return the stored result for `key` or try to compute and store it.
    ///
    /// Failures are propagated and leave no entry.
    pub fn try_get_or_compute<E>(
        &self,
        key: A,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let hash = self.combiner.combine(&key);

        let cached = self.data.read().lookup(hash, &key).cloned();
        if let Some(value) = cached {
            self.notify(Event::Hit, &key);

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(value);
        }

        self.notify(Event::Miss, &key);
        let result = compute();

        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        let value = result?;

        // A concurrent call with the same key may have inserted a value in
        // the meantime. That's okay.
        self.data.write().insert(hash, key, value.clone());

        Ok(value)
    }

    /// Peek at the stored result for `key` without computing anything.
    pub fn get(&self, key: &A) -> Option<V> {
        let hash = self.combiner.combine(key);
        self.data.read().lookup(hash, key).cloned()
    }

    /// Whether `key` has a stored result.
    pub fn contains(&self, key: &A) -> bool {
        let hash = self.combiner.combine(key);
        self.data.read().lookup(hash, key).is_some()
    }

    /// The number of stored results.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, event: Event, key: &A) {
        if let Some(observer) = &self.observer {
            observer.observe(event, key);
        }
    }
}

impl<A: Args, V: Clone> Default for SyncMemoCache<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V, C> Debug for SyncMemoCache<A, V, C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("SyncMemoCache")
            .field("len", &self.data.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn test_later_threads_hit() {
        let cache = SyncMemoCache::new();
        let runs = AtomicUsize::new(0);
        let square = |x: u64| {
            runs.fetch_add(1, Ordering::SeqCst);
            x * x
        };

        for _ in 0..4 {
            thread::scope(|s| {
                s.spawn(|| assert_eq!(cache.get_or_compute((9,), || square(9)), 81));
            });
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_misses_keep_one_entry() {
        let cache = SyncMemoCache::new();
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for x in 0..64u32 {
                        assert_eq!(cache.get_or_compute((x,), || x + 1), x + 1);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 64);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache = SyncMemoCache::new();
        assert_eq!(cache.try_get_or_compute(("k",), || Err::<u8, _>("down")), Err("down"));
        assert!(!cache.contains(&("k",)));
        assert_eq!(cache.try_get_or_compute(("k",), || Ok::<_, &str>(1)), Ok(1));
        assert_eq!(cache.get(&("k",)), Some(1));
    }
}
