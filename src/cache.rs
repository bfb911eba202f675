//! Identity-keyed memoization for type metadata.
//!
//! Type metadata is immutable for the lifetime of the process, so entries
//! are never invalidated and the cache never evicts. The number of distinct
//! keys is bounded by the number of registered types.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

/// Memoizing cache keyed by type identity.
///
/// Concurrent first access for the same key may run the factory more than
/// once; the first insert wins and every caller observes a complete value.
/// That trade keeps the read path lock-light and is safe because resolution
/// is pure for a given type identity.
pub struct TypeResolutionCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> TypeResolutionCache<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing it with `factory` on a
    /// miss. The factory runs outside any write lock so a slow computation
    /// never blocks readers of other keys.
    pub fn get_or_compute<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.entries.read().get(&key) {
            return value.clone();
        }

        let computed = factory();

        // A racing caller may have inserted first; keep their value so
        // every caller sees the same entry from here on.
        let mut entries = self.entries.write();
        entries.entry(key).or_insert(computed).clone()
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for TypeResolutionCache<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
