use std::fmt::{Debug, Display, Write as _};

use thiserror::Error;

use crate::{Color, Link, RbTree};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeViolation {
    #[error("root node is red")]
    RedRoot,
    #[error("red node {key} has a red child")]
    RedChild { key: String },
    #[error("black height differs below {key}: left {left}, right {right}")]
    BlackHeight {
        key: String,
        left: usize,
        right: usize,
    },
    #[error("key {key} is out of order")]
    Order { key: String },
    #[error("parent link of {key} is broken")]
    ParentLink { key: String },
    #[error("tree reaches {reachable} nodes but holds {len}")]
    Unreachable { reachable: usize, len: usize },
}

impl<K: Ord, V> RbTree<K, V> {
    /// Draws the tree one node per line, left subtree before right.
    pub fn render(&self) -> String
    where
        K: Display,
    {
        let mut out = format!("[{}]\n", self.len());
        if let Some(root) = self.root {
            self.render_node(root, ". ", "", true, &mut out);
        }
        out
    }

    fn render_node(&self, n: usize, side: &str, prefix: &str, last: bool, out: &mut String)
    where
        K: Display,
    {
        let node = &self.nodes[n];
        let branch = if last { "└── " } else { "├── " };
        let mark = match node.color {
            Color::Red => "R",
            Color::Black => "B",
        };
        let _ = writeln!(out, "{prefix}{branch}{side}{} ({mark})", node.key);

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        match (node.left, node.right) {
            (Some(left), Some(right)) => {
                self.render_node(left, "l ", &nested, false, out);
                self.render_node(right, "r ", &nested, true, out);
            }
            (Some(left), None) => self.render_node(left, "l ", &nested, true, out),
            (None, Some(right)) => self.render_node(right, "r ", &nested, true, out),
            (None, None) => {}
        }
    }
}

impl<K: Ord + Debug, V> RbTree<K, V> {
    /// Checks every red-black and search-tree invariant, returning the black
    /// height on success.
    pub fn validate(&self) -> Result<usize, TreeViolation> {
        let Some(root) = self.root else {
            return match self.len() {
                0 => Ok(0),
                len => Err(TreeViolation::Unreachable { reachable: 0, len }),
            };
        };
        if self.nodes[root].color == Color::Red {
            return Err(TreeViolation::RedRoot);
        }
        if self.nodes[root].parent.is_some() {
            return Err(self.violation(root, |key| TreeViolation::ParentLink { key }));
        }

        let mut reachable = 0;
        let height = self.check(Some(root), None, None, &mut reachable)?;
        if reachable != self.len() {
            return Err(TreeViolation::Unreachable {
                reachable,
                len: self.len(),
            });
        }
        Ok(height)
    }

    fn check(
        &self,
        link: Link,
        low: Option<&K>,
        high: Option<&K>,
        reachable: &mut usize,
    ) -> Result<usize, TreeViolation> {
        let Some(n) = link else {
            return Ok(0);
        };
        *reachable += 1;
        let node = &self.nodes[n];

        if low.is_some_and(|low| node.key <= *low) || high.is_some_and(|high| node.key >= *high) {
            return Err(self.violation(n, |key| TreeViolation::Order { key }));
        }

        for child in [node.left, node.right].into_iter().flatten() {
            if self.nodes[child].parent != Some(n) {
                return Err(self.violation(child, |key| TreeViolation::ParentLink { key }));
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(self.violation(n, |key| TreeViolation::RedChild { key }));
            }
        }

        let left = self.check(node.left, low, Some(&node.key), reachable)?;
        let right = self.check(node.right, Some(&node.key), high, reachable)?;
        if left != right {
            return Err(self.violation(n, |key| TreeViolation::BlackHeight { key, left, right }));
        }

        Ok(left + usize::from(node.color == Color::Black))
    }

    fn violation(&self, n: usize, build: impl FnOnce(String) -> TreeViolation) -> TreeViolation {
        build(format!("{:?}", self.nodes[n].key))
    }
}
