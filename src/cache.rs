use std::collections::HashMap;
use std::hash::Hash;

/// Load-once memoization. Entries live for the lifetime of the cache and are never
/// evicted or reloaded; the key space is the small fixed set the pages ask for.
pub struct ResourceCache<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V> ResourceCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load<F: FnOnce(&K) -> V>(&mut self, key: K, load: F) -> &V {
        self.entries.entry(key).or_insert_with_key(load)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
