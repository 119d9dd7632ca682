mod common;

use common::{init_test_setup, tree};
use treelib::{write_newick, write_subtree};

const DEPTH: usize = 50_000;

/// `(L0,(L1,(...(Ln-1,Z)...)));`
fn caterpillar(n: usize) -> String {
    let mut newick = String::with_capacity(n * 10);
    for i in 0..n {
        newick.push_str(&format!("(L{i},"));
    }
    newick.push('Z');
    newick.push_str(&")".repeat(n));
    newick.push(';');
    newick
}

/// `((...(A)...));`
fn chain(n: usize) -> String {
    format!("{}A{};", "(".repeat(n), ")".repeat(n))
}

#[test]
fn test_write_deep_caterpillar() {
    init_test_setup();
    let newick = caterpillar(DEPTH);
    let tree = tree(&newick);
    assert_eq!(tree.leaf_count(), DEPTH + 1);
    assert_eq!(write_newick(&tree), newick);

    let root = tree.root().unwrap();
    let inner = tree.child_ids(root)[1];
    let expected = format!("{};", &newick["(L0,".len()..newick.len() - ");".len()]);
    assert_eq!(write_subtree(&tree, inner).unwrap(), expected);
}

#[test]
fn test_draw_deep_chain() {
    init_test_setup();
    let newick = chain(DEPTH);
    let mut tree = tree(&newick);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(write_newick(&tree), newick);
    assert_eq!(tree.draw(), "+ A\n");
}

#[test]
fn test_draw_long_caterpillar() {
    init_test_setup();
    let n = 400;
    let text = tree(&caterpillar(n)).draw();
    let lines: Vec<&str> = text.lines().collect();
    // Each unlabelled junction below the root adds one row to the leaves.
    assert_eq!(lines.len(), (n + 1) + (n - 1));
    assert!(lines[0].starts_with('+') && lines[0].ends_with("- L0"));
    assert!(lines.last().unwrap().ends_with("- Z"));
}
