//! Property-based tests over generated tree shapes.

mod common;

use common::assert_weights_and_degrees;
use proptest::prelude::*;
use proptest::sample::Index;
use treelib::{parse_newick, write_newick, write_subtree};

#[derive(Debug, Clone)]
enum Shape {
    Leaf(String, f64),
    Internal(Vec<Shape>, f64),
}

impl Shape {
    fn render(&self, lengths: bool, root: bool, out: &mut String) {
        let length = match self {
            Shape::Leaf(label, length) => {
                out.push_str(label);
                length
            }
            Shape::Internal(children, length) => {
                out.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    child.render(lengths, false, out);
                }
                out.push(')');
                length
            }
        };
        if lengths && !root {
            out.push_str(&format!(":{length}"));
        }
    }

    fn newick(&self, lengths: bool) -> String {
        let mut out = String::new();
        self.render(lengths, true, &mut out);
        out.push(';');
        out
    }

    /// Edge lengths in preorder, root excluded.
    fn lengths(&self, root: bool, out: &mut Vec<f64>) {
        match self {
            Shape::Leaf(_, length) => {
                if !root {
                    out.push(*length);
                }
            }
            Shape::Internal(children, length) => {
                if !root {
                    out.push(*length);
                }
                for child in children {
                    child.lengths(false, out);
                }
            }
        }
    }
}

fn edge_length_strategy() -> impl Strategy<Value = f64> {
    (0u32..100_000).prop_map(|n| f64::from(n) / 1000.0)
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = ("[A-Za-z][A-Za-z0-9_]{0,6}", edge_length_strategy())
        .prop_map(|(label, length)| Shape::Leaf(label, length));
    leaf.prop_recursive(4, 48, 4, |inner| {
        (prop::collection::vec(inner, 2..5), edge_length_strategy())
            .prop_map(|(children, length)| Shape::Internal(children, length))
    })
}

fn internal_shape_strategy() -> impl Strategy<Value = Shape> {
    (prop::collection::vec(shape_strategy(), 2..5), edge_length_strategy())
        .prop_map(|(children, length)| Shape::Internal(children, length))
}

proptest! {
    #[test]
    fn round_trip_without_lengths(shape in shape_strategy()) {
        let newick = shape.newick(false);
        let tree = parse_newick(newick.as_str()).unwrap();
        prop_assert_eq!(write_newick(&tree), newick);
    }

    #[test]
    fn round_trip_with_lengths(shape in shape_strategy()) {
        let newick = shape.newick(true);
        let tree = parse_newick(newick.as_str()).unwrap();
        let written = write_newick(&tree);
        let reparsed = parse_newick(written.as_str()).unwrap();

        let mut expected = Vec::new();
        shape.lengths(true, &mut expected);
        let root = reparsed.root().unwrap();
        let found: Vec<f64> = reparsed
            .preorder()
            .into_iter()
            .filter(|&id| id != root)
            .map(|id| reparsed[id].edge_length().unwrap_or_default())
            .collect();
        prop_assert_eq!(found.len(), expected.len());
        for (a, b) in found.iter().zip(&expected) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn weights_and_degrees_hold(shape in shape_strategy()) {
        let mut tree = parse_newick(shape.newick(false).as_str()).unwrap();
        assert_weights_and_degrees(&tree);
        tree.update();
        assert_weights_and_degrees(&tree);
    }

    #[test]
    fn remove_node_counts(shape in internal_shape_strategy(), pick in any::<Index>()) {
        let mut tree = parse_newick(shape.newick(false).as_str()).unwrap();
        let leaves = tree.leaf_ids();
        let node = leaves[pick.index(leaves.len())];
        let parent = tree.parent(node).unwrap();
        let parent_degree = tree[parent].degree();
        let internals = tree.internal_count();
        let mut labels: Vec<String> =
            leaves.iter().filter(|&&id| id != node).map(|&id| tree[id].label().to_string()).collect();

        let _ = tree.remove_node(node).unwrap();

        if parent_degree == 2 {
            prop_assert_eq!(tree.internal_count(), internals - 1);
            prop_assert!(!tree.contains(parent));
        } else {
            prop_assert_eq!(tree.internal_count(), internals);
            prop_assert_eq!(tree[parent].degree(), parent_degree - 1);
        }
        prop_assert_eq!(tree.leaf_count(), leaves.len() - 1);
        let mut remaining: Vec<String> =
            tree.leaf_ids().into_iter().map(|id| tree[id].label().to_string()).collect();
        labels.sort();
        remaining.sort();
        prop_assert_eq!(remaining, labels);
        assert_weights_and_degrees(&tree);
    }

    #[test]
    fn copy_of_subtree_matches(shape in internal_shape_strategy(), pick in any::<Index>()) {
        let mut tree = parse_newick(shape.newick(true).as_str()).unwrap();
        let nodes = tree.preorder();
        let original = nodes[pick.index(nodes.len())];
        let copy = tree.copy_of_subtree(original).unwrap();

        let copied = tree.preorder_from(copy);
        prop_assert!(copied.iter().all(|id| !nodes.contains(id)));
        prop_assert_eq!(
            write_subtree(&tree, copy).unwrap(),
            write_subtree(&tree, original).unwrap()
        );
    }
}
