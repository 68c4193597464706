use crate::model::card::Card;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Sorted card ids of a hand; two orderings of the same cards share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandSignature(Vec<u8>);

impl HandSignature {
    pub fn of(cards: &[Card]) -> Self {
        let mut ids: Vec<u8> = cards.iter().map(|card| card.id()).collect();
        ids.sort_unstable();
        Self(ids)
    }

    pub fn ids(&self) -> &[u8] {
        &self.0
    }
}

/// Fixed-capacity map that evicts the least recently used entry.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    tick: u64,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let tick = self.next_tick();
        let (value, stamp) = self.entries.get_mut(key)?;
        self.recency.remove(stamp);
        *stamp = tick;
        self.recency.insert(tick, key.clone());
        Some(value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let tick = self.next_tick();
        if let Some((_, stamp)) = self.entries.insert(key.clone(), (value, tick)) {
            self.recency.remove(&stamp);
        }
        self.recency.insert(tick, key);
        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn cache_respects_capacity() {
        let mut cache = LruCache::new(1);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reads_refresh_recency() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = LruCache::new(0);
        cache.insert(1u8, 1u8);
        assert!(cache.is_empty());
    }

    #[test]
    fn signature_ignores_order() {
        let a = Card::new(Rank::Two, Suit::Clubs);
        let b = Card::new(Rank::Nine, Suit::Hearts);
        assert_eq!(HandSignature::of(&[a, b]), HandSignature::of(&[b, a]));
        assert_eq!(HandSignature::of(&[b, a]).ids(), &[a.id(), b.id()]);
    }
}
