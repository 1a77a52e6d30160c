use std::fmt::Write as _;

use rbtree::RbTree;

const DEMO_KEYS: std::ops::RangeInclusive<i64> = 0..=20;
const DEMO_DELETES: [i64; 8] = [1, 2, 4, 5, 7, 8, 10, 11];

/// Fills a tree with 0..=20, prints it, deletes a handful of keys from the
/// left side and prints it again.
pub fn insert_delete_demo() -> String {
    let mut tree: RbTree<i64, i64> = DEMO_KEYS.map(|key| (key, 0)).collect();
    let mut out = tree.render();

    for key in DEMO_DELETES {
        let _ = writeln!(out, "DELETE {key}");
        tree.remove(&key);
    }
    out.push_str(&tree.render());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_prints_before_and_after_deletes() {
        let out = insert_delete_demo();
        assert!(out.starts_with("[21]\n"));
        assert!(out.contains("DELETE 1\n"));
        assert!(out.contains("DELETE 11\n[13]\n"));
        for key in DEMO_DELETES {
            assert!(!out.rsplit("[13]").next().unwrap_or_default().contains(&format!(" {key} (")));
        }
    }
}
