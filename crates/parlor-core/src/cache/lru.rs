//! Fixed-capacity LRU cache over an index arena.
//!
//! Nodes live in a `Vec` of slots and point at their neighbours by index, so
//! the doubly linked recency list needs no raw pointers or reference counting.
//! Freed slots go on a free list and are reused by later insertions.
//!
//! The list runs from `head` (most recently used) to `tail` (least recently
//! used). `map` and the list always hold exactly the same keys.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// One entry of the recency list.
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Least-recently-used cache with a capacity fixed at construction.
///
/// `get`, `set`, and `delete` are O(1) amortized. Inserting past capacity
/// evicts from the tail until the cache fits again.
#[derive(Debug)]
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    max_size: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty cache holding at most `max_size` entries.
    ///
    /// A capacity of zero is clamped to one.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            max_size,
        }
    }

    /// Look up a key and mark it as most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.move_to_head(idx);
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    /// Look up a key without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    /// Insert or replace a value and make it the most recently used entry.
    ///
    /// An existing node for `key` is dropped first, so a key never occupies
    /// two nodes. Returns the entries evicted to get back within capacity.
    pub fn set(&mut self, key: K, value: V) -> Vec<(K, V)> {
        if let Some(idx) = self.map.remove(&key) {
            self.unlink(idx);
            self.release(idx);
        }

        let idx = self.alloc(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.push_head(idx);
        self.map.insert(key, idx);

        let mut evicted = Vec::new();
        while self.map.len() > self.max_size {
            match self.pop_tail() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Remove a key. No-op when absent.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.release(idx).map(|node| node.value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate from most to least recently used without touching recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cache: self,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }

    /// Snapshot of all entries, most recently used first.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // --- list plumbing ---

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<Node<K, V>> {
        let node = self.slots[idx].take();
        if node.is_some() {
            self.free.push(idx);
        }
        node
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.slots[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slots[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(node) = self.slots[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn push_head(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(node) = self.slots[h].as_mut() {
                node.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_head(idx);
    }

    fn pop_tail(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.unlink(idx);
        let node = self.release(idx)?;
        self.map.remove(&node.key);
        Some((node.key, node.value))
    }

    /// Walk the list and panic on any disagreement with the map.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = 0;
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let node = self.slots[idx]
                .as_ref()
                .unwrap_or_else(|| panic!("linked slot {idx} is vacant"));
            assert_eq!(node.prev, prev, "broken prev link at slot {idx}");
            assert_eq!(self.map.get(&node.key), Some(&idx), "list node missing from map");
            seen += 1;
            assert!(seen <= self.map.len(), "list is longer than the map (cycle?)");
            prev = Some(idx);
            cursor = node.next;
        }

        assert_eq!(self.tail, prev, "tail does not end the list");
        assert_eq!(seen, self.map.len(), "map holds keys missing from the list");
        assert!(self.map.len() <= self.max_size, "capacity exceeded");

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.map.len(), "leaked arena slot");
        assert_eq!(occupied + self.free.len(), self.slots.len(), "free list out of sync");
    }
}

/// Iterator over cache entries from most to least recently used.
pub struct Iter<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let cache = self.cache;
        let idx = self.cursor?;
        let node = cache.slots[idx].as_ref()?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(cache: &LruCache<String, i32>) -> Vec<String> {
        cache.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut cache: LruCache<String, i32> = LruCache::new(2);
        assert_eq!(cache.get("nope"), None);
        assert!(cache.is_empty());
        cache.assert_consistent();
    }

    #[test]
    fn test_get_after_set_returns_value() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(&1));
        cache.assert_consistent();
    }

    #[test]
    fn test_overflow_evicts_least_recent() {
        // Capacity 2: A, B, C -> A is gone.
        let mut cache = LruCache::new(2);
        cache.set("A".to_string(), 1);
        cache.set("B".to_string(), 2);
        let evicted = cache.set("C".to_string(), 3);

        assert_eq!(evicted, vec![("A".to_string(), 1)]);
        assert_eq!(cache.get("A"), None);
        assert_eq!(cache.get("B"), Some(&2));
        assert_eq!(cache.get("C"), Some(&3));
        assert_eq!(cache.len(), 2);
        cache.assert_consistent();
    }

    #[test]
    fn test_get_protects_from_eviction() {
        // Capacity 2: A, B, get(A), C -> B is gone.
        let mut cache = LruCache::new(2);
        cache.set("A".to_string(), 1);
        cache.set("B".to_string(), 2);
        assert_eq!(cache.get("A"), Some(&1));
        cache.set("C".to_string(), 3);

        assert_eq!(cache.get("B"), None);
        assert_eq!(cache.get("A"), Some(&1));
        assert_eq!(cache.get("C"), Some(&3));
        cache.assert_consistent();
    }

    #[test]
    fn test_accessed_key_outlives_untouched_keys() {
        let max = 4;
        let mut cache = LruCache::new(max);
        for i in 0..max {
            cache.set(format!("old-{i}"), i as i32);
        }
        cache.get("old-0");

        // Every untouched older key goes before old-0 does.
        for i in 0..max - 1 {
            cache.set(format!("new-{i}"), 100 + i as i32);
            assert!(cache.peek("old-0").is_some(), "old-0 evicted after {} inserts", i + 1);
        }
        for i in 1..max {
            assert!(cache.peek(format!("old-{i}").as_str()).is_none());
        }

        cache.set("new-last".to_string(), 999);
        assert!(cache.peek("old-0").is_none());
        cache.assert_consistent();
    }

    #[test]
    fn test_reset_updates_value_and_recency() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("a".to_string(), 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert_eq!(cache.peek("a"), Some(&10));
        cache.assert_consistent();
    }

    #[test]
    fn test_same_key_twice_reuses_slot() {
        let mut cache = LruCache::new(2);
        cache.set("a".to_string(), 1);
        cache.set("a".to_string(), 2);
        cache.set("a".to_string(), 3);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.slots.len(), 1);
        assert_eq!(cache.to_vec(), vec![("a".to_string(), 3)]);
        cache.assert_consistent();
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = LruCache::new(1);
        cache.set("a".to_string(), 1);
        cache.set("a".to_string(), 2);
        assert_eq!(cache.get("a"), Some(&2));

        let evicted = cache.set("b".to_string(), 3);
        assert_eq!(evicted, vec![("a".to_string(), 2)]);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(&3));
        assert_eq!(cache.len(), 1);
        cache.assert_consistent();
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.max_size(), 1);
        cache.set("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(&1));
    }

    #[test]
    fn test_delete_then_get() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("c".to_string(), 3);

        assert_eq!(cache.delete("b"), Some(2));
        assert_eq!(cache.get("b"), None);
        assert_eq!(keys(&cache), vec!["c", "a"]);
        cache.assert_consistent();

        assert_eq!(cache.delete("b"), None);
        assert_eq!(cache.delete("missing"), None);
        cache.assert_consistent();
    }

    #[test]
    fn test_delete_head_and_tail() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("c".to_string(), 3);

        cache.delete("c");
        cache.assert_consistent();
        cache.delete("a");
        cache.assert_consistent();
        assert_eq!(keys(&cache), vec!["b"]);

        cache.delete("b");
        cache.assert_consistent();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut cache = LruCache::new(2);
        for i in 0..50 {
            cache.set(format!("k{i}"), i);
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.slots.len() <= 3);
        cache.assert_consistent();
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.clear();

        assert!(cache.to_vec().is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("a"), None);
        cache.assert_consistent();

        cache.set("c".to_string(), 3);
        assert_eq!(cache.to_vec(), vec![("c".to_string(), 3)]);
        cache.assert_consistent();
    }

    #[test]
    fn test_to_vec_orders_most_recent_first() {
        let mut cache = LruCache::new(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("c".to_string(), 3);
        cache.get("a");

        assert_eq!(
            cache.to_vec(),
            vec![
                ("a".to_string(), 1),
                ("c".to_string(), 3),
                ("b".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = LruCache::new(2);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        assert_eq!(cache.peek("a"), Some(&1));
        cache.set("c".to_string(), 3);
        assert!(cache.peek("a").is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Set(u8, i32),
        Delete(u8),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..8).prop_map(Op::Get),
            6 => (0u8..8, any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
            2 => (0u8..8).prop_map(Op::Delete),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        /// Matches a naive vector-backed LRU for arbitrary operation sequences.
        #[test]
        fn prop_matches_reference_model(
            max in 1usize..6,
            ops in prop::collection::vec(op_strategy(), 0..200),
        ) {
            let mut cache: LruCache<u8, i32> = LruCache::new(max);
            // Most recent first.
            let mut model: Vec<(u8, i32)> = Vec::new();

            for op in ops {
                match op {
                    Op::Get(k) => {
                        let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                            let entry = model.remove(pos);
                            model.insert(0, entry);
                            entry.1
                        });
                        prop_assert_eq!(cache.get(&k).copied(), expected);
                    }
                    Op::Set(k, v) => {
                        model.retain(|(mk, _)| *mk != k);
                        model.insert(0, (k, v));
                        let mut expected_evicted = Vec::new();
                        while model.len() > max {
                            if let Some(entry) = model.pop() {
                                expected_evicted.push(entry);
                            }
                        }
                        prop_assert_eq!(cache.set(k, v), expected_evicted);
                        prop_assert_eq!(cache.get(&k), Some(&v));
                        // The get above already made k the head, as in the model.
                    }
                    Op::Delete(k) => {
                        let expected = model
                            .iter()
                            .position(|(mk, _)| *mk == k)
                            .map(|pos| model.remove(pos).1);
                        prop_assert_eq!(cache.delete(&k), expected);
                        prop_assert_eq!(cache.get(&k), None);
                    }
                    Op::Clear => {
                        model.clear();
                        cache.clear();
                    }
                }

                cache.assert_consistent();
                prop_assert!(cache.len() <= max);
                prop_assert_eq!(cache.to_vec(), model.clone());
            }
        }
    }
}
