//! Bounded key → value cache with least-recently-used eviction.
//!
//! Entries live in a `LinkedHashMap` kept in recency order: reads move an
//! entry to the back with `get_refresh`, evictions pop the front.

use linked_hash_map::LinkedHashMap;
use std::hash::Hash;

/// Fixed-capacity cache. Inserting past capacity evicts the entry that was
/// read or written least recently. A capacity of zero stores nothing.
#[derive(Debug)]
pub struct BoundedCache<K: Eq + Hash, V> {
    capacity: usize,
    entries: LinkedHashMap<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Counters reported by [`BoundedCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl<K: Eq + Hash, V> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: LinkedHashMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.entries.get_refresh(key) {
            Some(value) => {
                self.hits += 1;
                Some(&*value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace `key`. Returns the evicted entry, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        // Replacing an existing key moves it to the back without growing the map.
        if self.entries.insert(key, value).is_some() {
            return None;
        }
        if self.entries.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        if let Some(v) = self.get(&key) {
            return v.clone();
        }
        let value = make();
        self.insert(key, value.clone());
        value
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let evicted = self.entries.pop_front()?;
        self.evictions += 1;
        tracing::trace!(capacity = self.capacity, evictions = self.evictions, "cache eviction");
        Some(evicted)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
