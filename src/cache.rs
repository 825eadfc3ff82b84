use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::args::Args;
use crate::hash::{Combine, DefaultCombiner};
use crate::observe::{Event, Observer};
use crate::passthroughhasher::PassthroughHashMap;

/// A get-or-compute cache from argument tuples to results.
///
/// Entries are immutable once inserted and never evicted, so the cache grows
/// by at most one entry per distinct key. Bounding that growth is up to the
/// caller, typically through the size of the argument domain.
///
/// The cache is re-entrant: the computation passed to
/// [`get_or_compute`](Self::get_or_compute) may itself query the same cache.
/// It is not thread-safe; see [`SyncMemoCache`](crate::SyncMemoCache) for a
/// variant that is.
pub struct MemoCache<A, V, C = DefaultCombiner> {
    data: RefCell<CacheData<A, V>>,
    combiner: C,
    observer: RefCell<Option<Rc<dyn Observer<A>>>>,
    /// Keys whose computation is currently running, bucketed by hash.
    #[cfg(debug_assertions)]
    active: RefCell<PassthroughHashMap<u64, Vec<A>>>,
}

impl<A: Args, V: Clone> MemoCache<A, V> {
    /// Create an empty cache with the default combiner.
    pub fn new() -> Self {
        Self::with_combiner(DefaultCombiner::default())
    }
}

impl<A: Args, V: Clone, C: Combine> MemoCache<A, V, C> {
    /// Create an empty cache that hashes keys with `combiner`.
    pub fn with_combiner(combiner: C) -> Self {
        Self {
            data: RefCell::new(CacheData::default()),
            combiner,
            observer: RefCell::new(None),
            #[cfg(debug_assertions)]
            active: RefCell::default(),
        }
    }

    /// Attach an observer, replacing any previous one.
    pub fn observe(self, observer: impl Observer<A> + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    /// Attach an observer to a cache that is already in use.
    pub fn set_observer(&self, observer: impl Observer<A> + 'static) {
        *self.observer.borrow_mut() = Some(Rc::new(observer));
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
    /// A failed computation is propagated unchanged and leaves no entry, so
    /// the next request for the same key computes again from scratch.
    pub fn try_get_or_compute<E>(
        &self,
        key: A,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let hash = self.combiner.combine(&key);

        // The borrow ends with this statement so that nested lookups from
        // within `compute` don't panic.
        let cached = self.data.borrow().lookup(hash, &key).cloned();
        if let Some(value) = cached {
            self.notify(Event::Hit, &key);

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(value);
        }

        self.notify(Event::Miss, &key);

        let result = {
            #[cfg(debug_assertions)]
            let _guard = Active::enter(&self.active, hash, &key);
            compute()
        };

        // Registered after the computation so that nested calls don't
        // overwrite it.
        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        let value = result?;

        // Only a cyclic computation could have inserted the key in the
        // meantime. The first entry stays.
        self.data.borrow_mut().insert(hash, key, value.clone());

        Ok(value)
    }

    /// Peek at the stored result for `key` without computing anything.
    ///
    /// Observers are not notified.
    pub fn get(&self, key: &A) -> Option<V> {
        let hash = self.combiner.combine(key);
        self.data.borrow().lookup(hash, key).cloned()
    }

    /// Whether `key` has a stored result.
    pub fn contains(&self, key: &A) -> bool {
        let hash = self.combiner.combine(key);
        self.data.borrow().lookup(hash, key).is_some()
    }

    /// The number of stored results.
    pub fn len(&self) -> usize {
        self.data.borrow().len
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, event: Event, key: &A) {
        // Clone the handle so an observer may use the cache itself.
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            observer.observe(event, key);
        }
    }
}

impl<A: Args, V: Clone> Default for MemoCache<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies all entries into an independent cache. The observer is shared.
impl<A: Args, V: Clone, C: Combine + Clone> Clone for MemoCache<A, V, C> {
    fn clone(&self) -> Self {
        Self {
            data: RefCell::new(self.data.borrow().clone()),
            combiner: self.combiner.clone(),
            observer: RefCell::new(self.observer.borrow().clone()),
            #[cfg(debug_assertions)]
            active: RefCell::default(),
        }
    }
}

impl<A, V, C> Debug for MemoCache<A, V, C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("len", &self.data.borrow().len)
            .finish_non_exhaustive()
    }
}

/// Marks a key as being computed until dropped.
///
/// Running keys nest, so the key to remove on drop is always the last one
/// pushed to its bucket.
#[cfg(debug_assertions)]
struct Active<'a, A> {
    running: &'a RefCell<PassthroughHashMap<u64, Vec<A>>>,
    hash: u64,
}

#[cfg(debug_assertions)]
impl<'a, A: Args> Active<'a, A> {
    fn enter(running: &'a RefCell<PassthroughHashMap<u64, Vec<A>>>, hash: u64, key: &A) -> Self {
        let mut map = running.borrow_mut();
        let bucket = map.entry(hash).or_default();
        if bucket.contains(key) {
            panic!("fixmemo: cyclic memoized call (a computation requested its own key)");
        }
        bucket.push(key.clone());
        Self { running, hash }
    }
}

#[cfg(debug_assertions)]
impl<A> Drop for Active<'_, A> {
    fn drop(&mut self) {
        let mut map = self.running.borrow_mut();
        if let Some(bucket) = map.get_mut(&self.hash) {
            bucket.pop();
            if bucket.is_empty() {
                map.remove(&self.hash);
            }
        }
    }
}

/// Stored results, bucketed by combined hash.
pub(crate) struct CacheData<A, V> {
    /// Maps from combined hashes to all entries sharing that hash.
    map: PassthroughHashMap<u64, Vec<Entry<A, V>>>,
    /// The total number of entries across all buckets.
    len: usize,
}

impl<A: Eq, V> CacheData<A, V> {
    /// Look for the entry whose key is equal to `key`.
    pub(crate) fn lookup(&self, hash: u64, key: &A) -> Option<&V> {
        self.map
            .get(&hash)?
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    /// Insert an entry unless an equal key is already present.
    ///
    /// Returns whether the entry was inserted.
    pub(crate) fn insert(&mut self, hash: u64, key: A, value: V) -> bool {
        let bucket = self.map.entry(hash).or_default();
        if bucket.iter().any(|entry| entry.key == key) {
            return false;
        }
        bucket.push(Entry { key, value });
        self.len += 1;
        true
    }
}

impl<A, V> CacheData<A, V> {
    /// The total number of entries.
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl<A, V> Default for CacheData<A, V> {
    fn default() -> Self {
        Self { map: PassthroughHashMap::default(), len: 0 }
    }
}

impl<A: Clone, V: Clone> Clone for CacheData<A, V> {
    fn clone(&self) -> Self {
        Self { map: self.map.clone(), len: self.len }
    }
}

/// A memoized result.
#[derive(Clone)]
struct Entry<A, V> {
    /// The full key, compared on every lookup.
    key: A,
    /// The computation's output.
    value: V,
}
