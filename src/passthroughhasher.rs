use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

/// Hash map that re-uses an already combined `u64` as the hash value.
pub(crate) type PassthroughHashMap<Key, Value> =
    HashMap<Key, Value, BuildPassthroughHasher>;

#[derive(Copy, Clone, Default)]
pub(crate) struct BuildPassthroughHasher;

#[derive(Default)]
pub(crate) struct PassthroughHasher {
    value: u64,
}

impl Hasher for PassthroughHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.value
    }

    #[inline]
    fn write(&mut self, _bytes: &[u8]) {
        unimplemented!("Unsupported operation")
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.value = i;
    }
}

impl BuildHasher for BuildPassthroughHasher {
    type Hasher = PassthroughHasher;
    #[inline]
    fn build_hasher(&self) -> PassthroughHasher {
        PassthroughHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_keeps_value() {
        assert_eq!(BuildPassthroughHasher.hash_one(0x42u64), 0x42);
    }
}
