//! Hit/miss bookkeeping for tests.
//!
//! Every cache on the current thread records its lookups here when the
//! `testing` feature is enabled.

use std::cell::Cell;

thread_local! {
    /// Whether the last completed call was a cache hit.
    static LAST_WAS_HIT: Cell<bool> = const { Cell::new(false) };
    /// Hits and misses since the last reset.
    static COUNTS: Cell<(usize, usize)> = const { Cell::new((0, 0)) };
}

/// Whether the last completed call was a hit.
///
/// Misses are registered after the computation finishes, so nested calls
/// made by the computation do not leak into the outer call's result.
pub fn last_was_hit() -> bool {
    LAST_WAS_HIT.with(|cell| cell.get())
}

/// The number of hits registered on this thread.
pub fn hits() -> usize {
    COUNTS.with(|cell| cell.get().0)
}

/// The number of misses registered on this thread.
pub fn misses() -> usize {
    COUNTS.with(|cell| cell.get().1)
}

/// Reset the counters of this thread.
pub fn reset() {
    LAST_WAS_HIT.with(|cell| cell.set(false));
    COUNTS.with(|cell| cell.set((0, 0)));
}

/// Marks the last call as a cache hit.
pub(crate) fn register_hit() {
    LAST_WAS_HIT.with(|cell| cell.set(true));
    COUNTS.with(|cell| {
        let (hits, misses) = cell.get();
        cell.set((hits + 1, misses));
    });
}

/// Marks the last call as a cache miss.
pub(crate) fn register_miss() {
    LAST_WAS_HIT.with(|cell| cell.set(false));
    COUNTS.with(|cell| {
        let (hits, misses) = cell.get();
        cell.set((hits, misses + 1));
    });
}
