use std::collections::BTreeMap;

use aabb_quadtree::QuadTree;

use crate::Bounds;

/// An axis-aligned broad-phase index. Stores the exact bounds of every item beside the quadtree,
/// since the quadtree itself works in f32.
pub struct BoxIndex<K> {
    bounds: BTreeMap<K, Bounds>,
    quadtree: QuadTree<K>,
}

impl<K> BoxIndex<K>
where
    K: Clone + Ord + std::fmt::Debug,
{
    /// Every item added later must fit inside `bounds`.
    pub fn new(bounds: &Bounds) -> BoxIndex<K> {
        BoxIndex {
            bounds: BTreeMap::new(),
            quadtree: QuadTree::default(bounds.as_bbox()),
        }
    }

    pub fn add(&mut self, key: K, bounds: Bounds) {
        self.quadtree.insert_with_box(key.clone(), bounds.as_bbox());
        self.bounds.insert(key, bounds);
    }

    /// Every item whose bounds overlap the query, sorted by key.
    pub fn query(&self, bounds: &Bounds) -> Vec<K> {
        let mut result: Vec<K> = self
            .quadtree
            .query(bounds.as_bbox())
            .into_iter()
            .map(|(key, _, _)| key.clone())
            .filter(|key| self.bounds[key].overlaps(bounds))
            .collect();
        result.sort();
        result.dedup();
        result
    }

    pub fn get_bounds(&self, key: &K) -> Option<&Bounds> {
        self.bounds.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pt2D;

    #[test]
    fn finds_overlaps_in_order() {
        let world = Bounds::from(&[Pt2D::new(-100.0, -100.0), Pt2D::new(100.0, 100.0)]);
        let mut index = BoxIndex::new(&world);
        index.add(3, Bounds::from(&[Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 10.0)]));
        index.add(1, Bounds::from(&[Pt2D::new(5.0, 5.0), Pt2D::new(20.0, 20.0)]));
        index.add(2, Bounds::from(&[Pt2D::new(50.0, 50.0), Pt2D::new(60.0, 60.0)]));

        let query = Bounds::from(&[Pt2D::new(8.0, 8.0), Pt2D::new(9.0, 9.0)]);
        assert_eq!(index.query(&query), vec![1, 3]);
        let far = Bounds::from(&[Pt2D::new(-90.0, -90.0), Pt2D::new(-80.0, -80.0)]);
        assert!(index.query(&far).is_empty());
    }
}
