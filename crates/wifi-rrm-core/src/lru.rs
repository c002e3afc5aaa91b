//! Least-recently-used map.
//!
//! Nodes live in a dense `Vec` and are linked into a recency list by index;
//! a `HashMap` maps each key to its node. Lookups, insertions, removals and
//! evictions are all O(1). Removing a node swaps the last node into its slot
//! and patches that node's neighbors, so the arena never has holes.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Next more recently used node.
    prev: Option<usize>,
    /// Next less recently used node.
    next: Option<usize>,
}

/// A map that remembers access order and evicts the least recently used
/// entry once it holds more than its capacity.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: Option<usize>,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    /// Create a cache that tracks recency but never evicts.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up a value and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.touch(idx);
        Some(&self.nodes[idx].value)
    }

    /// Look up a value mutably and mark it most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.map.get(key)?;
        self.touch(idx);
        Some(&mut self.nodes[idx].value)
    }

    /// Look up a value without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Insert or replace a value and mark it most recently used.
    ///
    /// Returns the entry evicted to make room, if any. Replacing an existing
    /// key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.touch(idx);
            return None;
        }

        let evicted = if self.is_full() { self.pop_lru() } else { None };

        let idx = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.attach_front(idx);
        self.map.insert(key, idx);
        evicted
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        Some(self.remove_at(idx).value)
    }

    /// Remove and return the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        let node = self.remove_at(idx);
        self.map.remove(&node.key);
        Some((node.key, node.value))
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    fn is_full(&self) -> bool {
        self.capacity.map_or(false, |cap| self.nodes.len() >= cap)
    }

    fn touch(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    /// Unlink and take the node at `idx`. The caller fixes up `map` for the
    /// removed key; the moved node's map slot is fixed here.
    fn remove_at(&mut self, idx: usize) -> Node<K, V> {
        self.detach(idx);
        let node = self.nodes.swap_remove(idx);

        if idx < self.nodes.len() {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.map.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        node
    }
}

/// Iterator over cache entries, most recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.cursor?];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys<V>(cache: &LruCache<u32, V>) -> Vec<u32> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_evicts_least_recently_inserted() {
        let mut cache = LruCache::new(3);
        assert_eq!(cache.put(1, "a"), None);
        assert_eq!(cache.put(2, "b"), None);
        assert_eq!(cache.put(3, "c"), None);
        assert_eq!(cache.put(4, "d"), Some((1, "a")));

        assert_eq!(cache.len(), 3);
        assert_eq!(keys(&cache), vec![4, 3, 2]);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = LruCache::new(3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.put(4, "d"), Some((2, "b")));
        assert_eq!(keys(&cache), vec![4, 1, 3]);
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.peek(&1), Some(&"a"));
        assert_eq!(cache.put(3, "c"), Some((1, "a")));
    }

    #[test]
    fn test_replace_existing_key() {
        let mut cache = LruCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.put(1, "z"), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache), vec![1, 2]);
        assert_eq!(cache.peek(&1), Some(&"z"));
    }

    #[test]
    fn test_remove_middle_keeps_links() {
        let mut cache = LruCache::new(4);
        for k in 1..=4 {
            cache.put(k, k * 10);
        }

        assert_eq!(cache.remove(&3), Some(30));
        assert_eq!(cache.remove(&3), None);
        assert_eq!(keys(&cache), vec![4, 2, 1]);

        // The moved node must still be reachable by key.
        assert_eq!(cache.get(&4), Some(&40));
        assert_eq!(cache.pop_lru(), Some((1, 10)));
        assert_eq!(keys(&cache), vec![4, 2]);
    }

    #[test]
    fn test_capacity_zero_is_clamped() {
        let mut cache = LruCache::new(0);
        cache.put(1, ());
        cache.put(2, ());
        assert_eq!(cache.capacity(), Some(1));
        assert_eq!(keys(&cache), vec![2]);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut cache = LruCache::unbounded();
        for k in 0..1000 {
            assert_eq!(cache.put(k, ()), None);
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.capacity(), None);
    }

    #[test]
    fn test_clear() {
        let mut cache = LruCache::new(2);
        cache.put(1, ());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.pop_lru(), None);
        cache.put(2, ());
        assert_eq!(keys(&cache), vec![2]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Put(u8, u32),
        Get(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            (0u8..16).prop_map(Op::Get),
            (0u8..16).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_matches_naive_model(capacity in 1usize..8, ops in prop::collection::vec(op(), 0..200)) {
            let mut cache = LruCache::new(capacity);
            // Most recent first.
            let mut model: Vec<(u8, u32)> = Vec::new();

            for op in ops {
                match op {
                    Op::Put(k, v) => {
                        let expected = if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                            model.remove(pos);
                            None
                        } else if model.len() == capacity {
                            model.pop()
                        } else {
                            None
                        };
                        model.insert(0, (k, v));
                        prop_assert_eq!(cache.put(k, v), expected);
                    }
                    Op::Get(k) => {
                        let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                            let entry = model.remove(pos);
                            model.insert(0, entry);
                            entry.1
                        });
                        prop_assert_eq!(cache.get(&k).copied(), expected);
                    }
                    Op::Remove(k) => {
                        let expected = model
                            .iter()
                            .position(|(mk, _)| *mk == k)
                            .map(|pos| model.remove(pos).1);
                        prop_assert_eq!(cache.remove(&k), expected);
                    }
                }

                prop_assert!(cache.len() <= capacity);
                let actual: Vec<(u8, u32)> = cache.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(&actual, &model);
            }
        }
    }
}
