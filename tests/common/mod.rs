#![allow(dead_code)]

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use treelib::{Tree, parse_newick};

static TEST_SETUP: Once = Once::new();

/// Installs a test-writer `tracing` subscriber once per test binary. The level
/// comes from `RUST_LOG` and defaults to `debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_test_writer()
                .with_filter(env_filter),
        );
        let _ = tracing::subscriber::set_global_default(subscriber);
        info!("Test Setup complete");
    });
}

pub fn tree(newick: &str) -> Tree {
    parse_newick(newick).unwrap_or_else(|err| panic!("failed to parse {newick:?}: {err}"))
}

/// Leaf labels in left-to-right order.
pub fn leaf_labels(tree: &Tree) -> Vec<String> {
    tree.leaf_ids().into_iter().map(|id| tree[id].label().to_string()).collect()
}

/// Checks the weight and degree of every node against its children.
pub fn assert_weights_and_degrees(tree: &Tree) {
    for id in tree.preorder() {
        let children = tree.child_ids(id);
        let node = &tree[id];
        assert_eq!(node.degree(), children.len(), "degree of {:?}", node.label());
        let expected = if children.is_empty() {
            1
        } else {
            children.iter().map(|&c| tree[c].weight()).sum()
        };
        assert_eq!(node.weight(), expected, "weight of {:?}", node.label());
    }
}
