use std::collections::{BTreeMap, BTreeSet};

/// Indexes into a list, wrapping around at both ends. The list must not be empty.
pub fn wraparound_get<T>(vec: &[T], idx: isize) -> &T {
    let len = vec.len() as isize;
    let idx = idx % len;
    let idx = if idx >= 0 { idx } else { idx + len };
    &vec[idx as usize]
}

/// A map from a key to a set of values, iterated in sorted order.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    map: BTreeMap<K, BTreeSet<V>>,
    empty: BTreeSet<V>,
}

impl<K, V> MultiMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn new() -> MultiMap<K, V> {
        MultiMap {
            map: BTreeMap::new(),
            empty: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.entry(key).or_insert_with(BTreeSet::new).insert(value);
    }

    pub fn get(&self, key: K) -> &BTreeSet<V> {
        self.map.get(&key).unwrap_or(&self.empty)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> Default for MultiMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraparound() {
        let v = vec![1, 2, 3];
        assert_eq!(*wraparound_get(&v, -1), 3);
        assert_eq!(*wraparound_get(&v, 3), 1);
        assert_eq!(*wraparound_get(&v, 1), 2);
    }

    #[test]
    fn multimap() {
        let mut mm = MultiMap::new();
        mm.insert("a", 3);
        mm.insert("a", 1);
        mm.insert("a", 3);
        assert_eq!(mm.get("a").iter().cloned().collect::<Vec<_>>(), vec![1, 3]);
        assert!(mm.get("b").is_empty());
    }
}
