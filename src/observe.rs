use std::fmt::{self, Display, Formatter};

/// What happened during a cache lookup.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Event {
    /// The key had a stored result; no computation ran.
    Hit,
    /// The key was absent; the computation runs next.
    Miss,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        })
    }
}

/// Receives cache hit and miss notifications.
///
/// Observers are purely informational: they see the key involved but cannot
/// influence what the cache returns or stores. Any `Fn(Event, &A)` closure
/// is an observer.
pub trait Observer<A> {
    /// Called once per lookup.
    fn observe(&self, event: Event, key: &A);
}

impl<A, F> Observer<A> for F
where
    F: Fn(Event, &A),
{
    fn observe(&self, event: Event, key: &A) {
        self(event, key)
    }
}

/// Reports lookups as `tracing` events at trace level.
#[cfg(feature = "tracing")]
#[derive(Debug, Copy, Clone)]
pub struct Trace {
    name: &'static str,
}

#[cfg(feature = "tracing")]
impl Trace {
    /// Label the events of one cache with `name`.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[cfg(feature = "tracing")]
impl<A: fmt::Debug> Observer<A> for Trace {
    fn observe(&self, event: Event, key: &A) {
        tracing::trace!(target: "fixmemo", cache = self.name, ?key, "cache {event}");
    }
}
