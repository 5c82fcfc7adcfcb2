//! Fixed-capacity result cache with first-in-first-out eviction

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Capacity used when none is configured
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// Bounded key/value store that evicts the oldest inserted key
///
/// Reads never change the eviction order, and overwriting an existing key
/// keeps its original position.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    // Oldest key at the front
    order: VecDeque<K>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a value, returning the evicted key if one had to go
    ///
    /// A zero-capacity cache stores nothing.
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        evicted
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        Some(oldest)
    }

    /// Remove a single key; absent keys are ignored
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys in insertion order, oldest first
    pub fn keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[&'static str]) -> BoundedCache<&'static str, u32> {
        let mut cache = BoundedCache::new(3);
        for (i, key) in keys.iter().enumerate() {
            cache.put(*key, i as u32);
        }
        cache
    }

    #[test]
    fn test_basic_operations() {
        let mut cache = BoundedCache::new(2);
        assert!(cache.is_empty());

        cache.put("a", 1);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"missing"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn test_evicts_first_inserted_key() {
        let mut cache = filled(&["q1", "q2", "q3"]);

        let evicted = cache.put("q4", 4);

        assert_eq!(evicted, Some("q1"));
        assert_eq!(cache.keys(), vec!["q2", "q3", "q4"]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_reads_do_not_refresh_position() {
        let mut cache = filled(&["q1", "q2", "q3"]);

        // An LRU cache would keep q1 after these reads
        for _ in 0..5 {
            assert!(cache.get(&"q1").is_some());
        }
        cache.put("q4", 4);

        assert!(!cache.contains(&"q1"));
        assert!(cache.contains(&"q2"));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut cache = filled(&["q1", "q2", "q3"]);

        assert_eq!(cache.put("q1", 100), None);
        assert_eq!(cache.get(&"q1"), Some(&100));
        assert_eq!(cache.keys(), vec!["q1", "q2", "q3"]);

        // Still the oldest, so it is the next to go
        assert_eq!(cache.put("q4", 4), Some("q1"));
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut cache = BoundedCache::new(3);
        for i in 0..50u32 {
            cache.put(i, i);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.keys(), vec![47, 48, 49]);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut cache = filled(&["q1", "q2"]);
        assert_eq!(cache.remove(&"nope"), None);
        assert_eq!(cache.remove(&"q1"), Some(0));
        assert_eq!(cache.keys(), vec!["q2"]);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = BoundedCache::new(0);
        assert_eq!(cache.put("a", 1), None);
        assert!(cache.is_empty());
    }
}
