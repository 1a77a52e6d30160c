//! Arena-backed red-black tree.
//!
//! Nodes live in a dense `Vec` and refer to each other by index. Removing a
//! node swaps the last slot into the hole and patches the links of the moved
//! node, so the arena never holds vacant slots.

use std::{cmp::Ordering, mem};

mod iter;
mod render;

pub use iter::Range;
pub use render::TreeViolation;

type Link = Option<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A red uncle was found: parent and uncle turned black, grandparent red.
    Recolor,
    RotateLeft,
    RotateRight,
}

/// One balancing step of an insertion, keyed by the node it pivoted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceStep<K> {
    pub kind: StepKind,
    pub key: K,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTrace<K> {
    /// `false` when the key was already present and nothing changed.
    pub inserted: bool,
    pub steps: Vec<BalanceStep<K>>,
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Link,
    right: Link,
    parent: Link,
}

#[derive(Debug, Clone)]
pub struct RbTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Link,
    journal: Option<Vec<(StepKind, usize)>>,
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            journal: None,
        }
    }
}

impl<K: Ord, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|n| &self.nodes[n].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.entry(self.minimum(r)))
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.entry(self.maximum(r)))
    }

    /// Inserts or overwrites, returning the previous value for an existing key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key) {
            Ok(existing) => Some(mem::replace(&mut self.nodes[existing].value, value)),
            Err(parent) => {
                self.attach(parent, key, value);
                None
            }
        }
    }

    /// Inserts only when the key is missing. Returns whether a node was added.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        match self.locate(&key) {
            Ok(_) => false,
            Err(parent) => {
                self.attach(parent, key, value);
                true
            }
        }
    }

    /// Overwrites the value of an existing key; missing keys are left alone.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.find(&key)
            .map(|n| mem::replace(&mut self.nodes[n].value, value))
    }

    /// Like [`RbTree::insert_if_absent`], recording every balancing step.
    pub fn insert_traced(&mut self, key: K, value: V) -> InsertTrace<K>
    where
        K: Clone,
    {
        let parent = match self.locate(&key) {
            Ok(_) => {
                return InsertTrace {
                    inserted: false,
                    steps: Vec::new(),
                }
            }
            Err(parent) => parent,
        };

        self.journal = Some(Vec::new());
        self.attach(parent, key, value);
        let journal = self.journal.take().unwrap_or_default();

        // Inserting never moves arena slots, so journal indices are still valid.
        let steps = journal
            .into_iter()
            .map(|(kind, n)| BalanceStep {
                kind,
                key: self.nodes[n].key.clone(),
            })
            .collect();

        InsertTrace {
            inserted: true,
            steps,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let z = self.find(key)?;
        let mut removed_color = self.nodes[z].color;
        let x: Link;
        let x_parent: Link;

        match (self.nodes[z].left, self.nodes[z].right) {
            (None, right) => {
                x = right;
                x_parent = self.nodes[z].parent;
                self.transplant(z, right);
            }
            (left, None) => {
                x = left;
                x_parent = self.nodes[z].parent;
                self.transplant(z, left);
            }
            (Some(left), Some(right)) => {
                let y = self.minimum(right);
                removed_color = self.nodes[y].color;
                x = self.nodes[y].right;

                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, self.nodes[y].right);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                }

                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].color = self.nodes[z].color;
            }
        }

        if removed_color == Color::Black {
            self.remove_fixup(x, x_parent);
        }

        Some(self.release(z))
    }

    pub fn range<R>(&self, bounds: R) -> Range<'_, K, V>
    where
        R: std::ops::RangeBounds<K>,
    {
        Range::new(self, bounds)
    }

    pub fn iter(&self) -> Range<'_, K, V> {
        self.range(..)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    fn entry(&self, n: usize) -> (&K, &V) {
        let node = &self.nodes[n];
        (&node.key, &node.value)
    }

    fn find(&self, key: &K) -> Link {
        self.locate(key).ok()
    }

    /// `Ok(node)` holding the key, or `Err(parent)` to hang a new node from.
    fn locate(&self, key: &K) -> Result<usize, Link> {
        let mut parent = None;
        let mut cursor = self.root;
        while let Some(n) = cursor {
            parent = Some(n);
            cursor = match key.cmp(&self.nodes[n].key) {
                Ordering::Less => self.nodes[n].left,
                Ordering::Greater => self.nodes[n].right,
                Ordering::Equal => return Ok(n),
            };
        }
        Err(parent)
    }

    fn attach(&mut self, parent: Link, key: K, value: V) {
        let z = self.nodes.len();
        let goes_left = parent.is_some_and(|p| key < self.nodes[p].key);
        self.nodes.push(Node {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        });

        match parent {
            None => self.root = Some(z),
            Some(p) if goes_left => self.nodes[p].left = Some(z),
            Some(p) => self.nodes[p].right = Some(z),
        }

        self.insert_fixup(z);
    }

    fn color(&self, n: Link) -> Color {
        n.map_or(Color::Black, |n| self.nodes[n].color)
    }

    fn set_color(&mut self, n: Link, color: Color) {
        if let Some(n) = n {
            self.nodes[n].color = color;
        }
    }

    fn record(&mut self, kind: StepKind, n: usize) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((kind, n));
        }
    }

    fn minimum(&self, mut n: usize) -> usize {
        while let Some(left) = self.nodes[n].left {
            n = left;
        }
        n
    }

    fn maximum(&self, mut n: usize) -> usize {
        while let Some(right) = self.nodes[n].right {
            n = right;
        }
        n
    }

    fn successor(&self, n: usize) -> Link {
        if let Some(right) = self.nodes[n].right {
            return Some(self.minimum(right));
        }
        let mut child = n;
        let mut parent = self.nodes[n].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn predecessor(&self, n: usize) -> Link {
        if let Some(left) = self.nodes[n].left {
            return Some(self.maximum(left));
        }
        let mut child = n;
        let mut parent = self.nodes[n].parent;
        while let Some(p) = parent {
            if self.nodes[p].left != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn replace_child(&mut self, parent: Link, old: usize, new: Link) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn transplant(&mut self, u: usize, v: Link) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    fn rotate_left(&mut self, x: usize) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        self.record(StepKind::RotateLeft, x);

        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: usize) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        self.record(StepKind::RotateRight, x);

        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while let Some(p) = self.nodes[z].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // a red parent is never the root
            let Some(g) = self.nodes[p].parent else {
                break;
            };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.color(uncle) == Color::Red {
                    self.record(StepKind::Recolor, g);
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                let mut p = p;
                if self.nodes[p].right == Some(z) {
                    self.rotate_left(p);
                    p = z;
                }
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_right(g);
            } else {
                let uncle = self.nodes[g].left;
                if self.color(uncle) == Color::Red {
                    self.record(StepKind::Recolor, g);
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                    continue;
                }
                let mut p = p;
                if self.nodes[p].left == Some(z) {
                    self.rotate_right(p);
                    p = z;
                }
                self.nodes[p].color = Color::Black;
                self.nodes[g].color = Color::Red;
                self.rotate_left(g);
            }
            break;
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Restores the black height after a black node left the position of `x`.
    /// `x` may be nil, so its parent is tracked separately.
    fn remove_fixup(&mut self, mut x: Link, mut parent: Link) {
        while x != self.root && self.color(x) == Color::Black {
            let Some(p) = parent else {
                break;
            };

            if self.nodes[p].left == x {
                let Some(mut w) = self.nodes[p].right else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(sibling) = self.nodes[p].right else {
                        break;
                    };
                    w = sibling;
                }

                let (near, far) = (self.nodes[w].left, self.nodes[w].right);
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                }

                if self.color(far) == Color::Black {
                    self.set_color(near, Color::Black);
                    self.nodes[w].color = Color::Red;
                    self.rotate_right(w);
                    let Some(sibling) = self.nodes[p].right else {
                        break;
                    };
                    w = sibling;
                }

                self.nodes[w].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                let far = self.nodes[w].right;
                self.set_color(far, Color::Black);
                self.rotate_left(p);
            } else {
                let Some(mut w) = self.nodes[p].left else {
                    break;
                };
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(sibling) = self.nodes[p].left else {
                        break;
                    };
                    w = sibling;
                }

                let (near, far) = (self.nodes[w].right, self.nodes[w].left);
                if self.color(near) == Color::Black && self.color(far) == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                }

                if self.color(far) == Color::Black {
                    self.set_color(near, Color::Black);
                    self.nodes[w].color = Color::Red;
                    self.rotate_left(w);
                    let Some(sibling) = self.nodes[p].left else {
                        break;
                    };
                    w = sibling;
                }

                self.nodes[w].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                let far = self.nodes[w].left;
                self.set_color(far, Color::Black);
                self.rotate_right(p);
            }
            x = self.root;
            parent = None;
        }

        self.set_color(x, Color::Black);
    }

    /// Drops an already unlinked node from the arena and returns its value.
    fn release(&mut self, z: usize) -> V {
        let last = self.nodes.len() - 1;
        let removed = self.nodes.swap_remove(z);
        if z != last {
            // the node formerly at `last` now lives at `z`
            let moved = &self.nodes[z];
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            match parent {
                None => self.root = Some(z),
                Some(p) if self.nodes[p].left == Some(last) => self.nodes[p].left = Some(z),
                Some(p) => self.nodes[p].right = Some(z),
            }
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(z);
            }
        }
        removed.value
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (key, value) in iter {
            tree.insert(key, value);
        }
        tree
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
