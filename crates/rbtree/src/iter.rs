use std::ops::{Bound, RangeBounds};

use crate::{Link, RbTree};

/// Ordered iterator over a key range. Iterates backwards with `.rev()`.
pub struct Range<'a, K, V> {
    tree: &'a RbTree<K, V>,
    front: Link,
    back: Link,
}

impl<'a, K: Ord, V> Range<'a, K, V> {
    pub(crate) fn new<R: RangeBounds<K>>(tree: &'a RbTree<K, V>, bounds: R) -> Self {
        let front = tree.lower_bound(bounds.start_bound());
        let back = tree.upper_bound(bounds.end_bound());

        let empty = match (front, back) {
            (Some(f), Some(b)) => tree.nodes[f].key > tree.nodes[b].key,
            _ => true,
        };
        if empty {
            return Self {
                tree,
                front: None,
                back: None,
            };
        }

        Self { tree, front, back }
    }

    fn finish_if_met(&mut self, current: usize) -> bool {
        if self.front == self.back {
            debug_assert_eq!(self.front, Some(current));
            self.front = None;
            self.back = None;
            return true;
        }
        false
    }
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;
        if !self.finish_if_met(current) {
            self.front = self.tree.successor(current);
        }
        let tree = self.tree;
        let node = &tree.nodes[current];
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;
        if !self.finish_if_met(current) {
            self.back = self.tree.predecessor(current);
        }
        let tree = self.tree;
        let node = &tree.nodes[current];
        Some((&node.key, &node.value))
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// First node inside `bound` from below.
    fn lower_bound(&self, bound: Bound<&K>) -> Link {
        let mut best = None;
        let mut cursor = self.root;
        while let Some(n) = cursor {
            let key = &self.nodes[n].key;
            let inside = match bound {
                Bound::Unbounded => true,
                Bound::Included(start) => key >= start,
                Bound::Excluded(start) => key > start,
            };
            if inside {
                best = Some(n);
                cursor = self.nodes[n].left;
            } else {
                cursor = self.nodes[n].right;
            }
        }
        best
    }

    /// Last node inside `bound` from above.
    fn upper_bound(&self, bound: Bound<&K>) -> Link {
        let mut best = None;
        let mut cursor = self.root;
        while let Some(n) = cursor {
            let key = &self.nodes[n].key;
            let inside = match bound {
                Bound::Unbounded => true,
                Bound::Included(end) => key <= end,
                Bound::Excluded(end) => key < end,
            };
            if inside {
                best = Some(n);
                cursor = self.nodes[n].right;
            } else {
                cursor = self.nodes[n].left;
            }
        }
        best
    }
}
