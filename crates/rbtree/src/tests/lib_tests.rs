use std::collections::BTreeMap;

use super::*;

fn shuffled(len: i64, seed: u64) -> Vec<i64> {
    let mut values: Vec<i64> = (0..len).collect();
    let mut state = seed;
    for i in (1..values.len()).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        values.swap(i, j);
    }
    values
}

fn keys(range: Range<'_, i64, ()>) -> Vec<i64> {
    range.map(|(k, _)| *k).collect()
}

fn orders() -> Vec<Vec<i64>> {
    vec![
        (0..=100).collect(),
        (0..=100).rev().collect(),
        shuffled(101, 7),
        shuffled(101, 42),
    ]
}

#[test]
fn new_tree_is_empty() {
    let tree: RbTree<i64, ()> = RbTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.validate(), Ok(0));
}

#[test]
fn insert_keeps_invariants_and_overwrites_existing_values() {
    for order in orders() {
        let mut tree = RbTree::new();
        for &key in &order {
            assert_eq!(tree.insert(key, key * 10), None);
            tree.validate().expect("valid after insert");
        }
        assert_eq!(tree.len(), order.len());

        for &key in &order {
            assert_eq!(tree.insert(key, -key), Some(key * 10));
        }
        assert_eq!(tree.len(), order.len());
        assert_eq!(tree.get(&40), Some(&-40));
    }
}

#[test]
fn insert_if_absent_leaves_existing_values() {
    let mut tree = RbTree::new();
    assert!(tree.insert_if_absent(5, "five"));
    assert!(!tree.insert_if_absent(5, "cinq"));
    assert_eq!(tree.get(&5), Some(&"five"));
    assert_eq!(tree.len(), 1);
}

#[test]
fn replace_only_touches_existing_keys() {
    let mut tree = RbTree::new();
    assert_eq!(tree.replace(1, 'a'), None);
    assert!(tree.is_empty());

    tree.insert(1, 'a');
    assert_eq!(tree.replace(1, 'b'), Some('a'));
    assert_eq!(tree.get(&1), Some(&'b'));
}

#[test]
fn remove_keeps_invariants_in_every_order() {
    for insert_order in orders() {
        for remove_order in orders() {
            let mut tree: RbTree<i64, i64> = insert_order.iter().map(|&k| (k, k + 1)).collect();
            for (removed, &key) in remove_order.iter().enumerate() {
                assert_eq!(tree.remove(&key), Some(key + 1));
                assert_eq!(tree.remove(&key), None);
                assert_eq!(tree.len(), remove_order.len() - removed - 1);
                tree.validate().expect("valid after remove");
            }
            assert!(tree.is_empty());
        }
    }
}

#[test]
fn interleaved_inserts_and_removes_stay_consistent() {
    let mut tree = RbTree::new();
    for key in shuffled(200, 3) {
        tree.insert(key, ());
    }
    for key in (0..200).filter(|k| k % 3 == 0) {
        assert_eq!(tree.remove(&key), Some(()));
    }
    for key in (0..200).filter(|k| k % 6 == 0) {
        assert!(tree.insert_if_absent(key, ()));
    }
    tree.validate().expect("valid");

    let expected: Vec<i64> = (0..200).filter(|k| k % 3 != 0 || k % 6 == 0).collect();
    let keys: Vec<i64> = tree.keys().copied().collect();
    assert_eq!(keys, expected);
}

#[test]
fn min_and_max_follow_removals() {
    let mut tree: RbTree<i64, ()> = shuffled(20, 11).into_iter().map(|k| (k, ())).collect();
    assert_eq!(tree.min(), Some((&0, &())));
    assert_eq!(tree.max(), Some((&19, &())));

    tree.remove(&0);
    tree.remove(&19);
    assert_eq!(tree.min().map(|(k, _)| *k), Some(1));
    assert_eq!(tree.max().map(|(k, _)| *k), Some(18));
}

#[test]
fn range_iterates_in_order_both_ways() {
    let tree: RbTree<i64, ()> = shuffled(50, 5).into_iter().map(|k| (k, ())).collect();

    assert_eq!(keys(tree.range(10..15)), vec![10, 11, 12, 13, 14]);
    assert_eq!(keys(tree.range(10..=15)), vec![10, 11, 12, 13, 14, 15]);
    assert_eq!(keys(tree.range(47..)), vec![47, 48, 49]);
    assert_eq!(keys(tree.range(..3)), vec![0, 1, 2]);
    assert_eq!(keys(tree.range(..)).len(), 50);

    let descending: Vec<i64> = tree.range(10..=15).rev().map(|(k, _)| *k).collect();
    assert_eq!(descending, vec![15, 14, 13, 12, 11, 10]);

    assert!(keys(tree.range(60..70)).is_empty());
    assert!(keys(tree.range(20..20)).is_empty());
}

#[test]
fn range_meets_in_the_middle_from_both_ends() {
    let tree: RbTree<i64, ()> = (0..6).map(|k| (k, ())).collect();
    let mut range = tree.iter();
    assert_eq!(range.next().map(|(k, _)| *k), Some(0));
    assert_eq!(range.next_back().map(|(k, _)| *k), Some(5));
    assert_eq!(range.next().map(|(k, _)| *k), Some(1));
    assert_eq!(range.next_back().map(|(k, _)| *k), Some(4));
    assert_eq!(range.next().map(|(k, _)| *k), Some(2));
    assert_eq!(range.next_back().map(|(k, _)| *k), Some(3));
    assert_eq!(range.next(), None);
    assert_eq!(range.next_back(), None);
}

#[test]
fn range_with_gaps_snaps_to_present_keys() {
    let tree: RbTree<i64, ()> = (0..20).step_by(5).map(|k| (k, ())).collect();
    let keys: Vec<i64> = tree.range(3..12).map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![5, 10]);
}

#[test]
fn traced_insert_reports_rotations_and_recolors() {
    let mut tree = RbTree::new();
    assert!(tree.insert_traced(1, ()).steps.is_empty());
    assert!(tree.insert_traced(2, ()).steps.is_empty());

    let trace = tree.insert_traced(3, ());
    assert!(trace.inserted);
    assert_eq!(
        trace.steps,
        vec![BalanceStep {
            kind: StepKind::RotateLeft,
            key: 1
        }]
    );

    let trace = tree.insert_traced(4, ());
    assert_eq!(
        trace.steps,
        vec![BalanceStep {
            kind: StepKind::Recolor,
            key: 2
        }]
    );

    let duplicate = tree.insert_traced(4, ());
    assert!(!duplicate.inserted);
    assert!(duplicate.steps.is_empty());
    tree.validate().expect("valid");
}

#[test]
fn traced_insert_reports_double_rotation() {
    let mut tree = RbTree::new();
    tree.insert(3, ());
    tree.insert(1, ());

    let trace = tree.insert_traced(2, ());
    let kinds: Vec<StepKind> = trace.steps.iter().map(|step| step.kind).collect();
    assert_eq!(kinds, vec![StepKind::RotateLeft, StepKind::RotateRight]);
    assert_eq!(tree.render(), "[3]\n└── . 2 (B)\n    ├── l 1 (R)\n    └── r 3 (R)\n");
}

#[test]
fn render_marks_side_and_color() {
    let tree: RbTree<i64, ()> = [2, 1, 3, 4].into_iter().map(|k| (k, ())).collect();
    let expected = "\
[4]
└── . 2 (B)
    ├── l 1 (B)
    └── r 3 (B)
        └── r 4 (R)
";
    assert_eq!(tree.render(), expected);
}

#[test]
fn render_works_for_any_displayable_key() {
    let tree: RbTree<String, ()> = ["b", "a", "c"]
        .into_iter()
        .map(|k| (k.to_string(), ()))
        .collect();
    assert_eq!(tree.render(), "[3]\n└── . b (B)\n    ├── l a (R)\n    └── r c (R)\n");
}

#[test]
fn random_operations_match_btreemap() {
    let mut tree: RbTree<i64, u64> = RbTree::new();
    let mut model: BTreeMap<i64, u64> = BTreeMap::new();
    let mut state = 99u64;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    };

    for step in 0..20_000u64 {
        let key = (next() % 500) as i64;
        match next() % 4 {
            0 | 1 => assert_eq!(tree.insert(key, step), model.insert(key, step)),
            2 => assert_eq!(tree.remove(&key), model.remove(&key)),
            _ => {
                let hi = key + (next() % 50) as i64;
                let got: Vec<(i64, u64)> = tree.range(key..hi).map(|(k, v)| (*k, *v)).collect();
                let want: Vec<(i64, u64)> = model.range(key..hi).map(|(k, v)| (*k, *v)).collect();
                assert_eq!(got, want);
            }
        }
        assert_eq!(tree.len(), model.len());
        if step % 100 == 0 {
            tree.validate().expect("valid tree");
        }
    }

    tree.validate().expect("valid tree");
    let all: Vec<(i64, u64)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(all, model.into_iter().collect::<Vec<_>>());
}

#[test]
fn clear_drops_everything() {
    let mut tree: RbTree<i64, ()> = (0..10).map(|k| (k, ())).collect();
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.iter().count(), 0);
    assert!(tree.insert_if_absent(1, ()));
    assert_eq!(tree.validate(), Ok(1));
}
