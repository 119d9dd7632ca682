use super::super::super::phylo::node::NodeId;
use super::super::super::phylo::tree::{Tree, TreeError};
use super::labels::nexus_string;

/// Converts a [Tree] to a Newick string terminated by `;`.
///
/// An empty tree writes as `;`.
pub fn write_newick(tree: &Tree) -> String {
    let mut newick = String::new();
    if let Some(root) = tree.root() {
        write_node(tree, root, &mut newick);
        if let (true, Some(length)) = (tree.has_edge_lengths(), tree[root].edge_length()) {
            newick.push_str(&format!(":{length}"));
        }
    }
    newick.push(';');
    newick
}

/// Converts the subtree rooted at `node_id` to a Newick string. The edge
/// above `node_id` is not part of the subtree, so its length is never
/// written.
pub fn write_subtree(tree: &Tree, node_id: NodeId) -> Result<String, TreeError> {
    if !tree.contains(node_id) {
        return Err(TreeError::NodeNotFound(node_id));
    }
    let mut newick = String::new();
    write_node(tree, node_id, &mut newick);
    newick.push(';');
    Ok(newick)
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Writes `top` and everything below it, without the length of `top`.
fn write_node(tree: &Tree, top: NodeId, newick: &mut String) {
    let mut stack = vec![Step::Enter(top)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node_id) => {
                if node_id != top && !tree.is_first_child(node_id) {
                    newick.push(',');
                }
                let node = &tree[node_id];
                if node.child().is_none() {
                    newick.push_str(&nexus_string(node.label()));
                    write_length(tree, top, node_id, newick);
                    continue;
                }
                newick.push('(');
                stack.push(Step::Exit(node_id));
                let mut children = tree.child_ids(node_id);
                children.reverse();
                stack.extend(children.into_iter().map(Step::Enter));
            }
            Step::Exit(node_id) => {
                newick.push(')');
                let node = &tree[node_id];
                if tree.has_internal_labels() && !node.label().is_empty() {
                    newick.push_str(&nexus_string(node.label()));
                }
                write_length(tree, top, node_id, newick);
            }
        }
    }
}

fn write_length(tree: &Tree, top: NodeId, node_id: NodeId, newick: &mut String) {
    if node_id != top && tree.has_edge_lengths() {
        let length = tree[node_id].edge_length().unwrap_or_default();
        newick.push_str(&format!(":{length}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_newick;

    #[test]
    fn writes_what_was_read() {
        let test_cases = vec![
            "(A:1,(B:2,C:3):4);",
            "(A,B,C);",
            "((A,B)X,(C,D)Y)R;",
            "(A:0.5,B:0.25)R:0.1;",
            "('it''s',Homo_sapiens,'1a');",
            "A;",
        ];
        for newick in test_cases {
            let tree = parse_newick(newick).unwrap();
            assert_eq!(write_newick(&tree), newick);
        }
    }

    #[test]
    fn spaces_in_labels_become_underscores() {
        let tree = parse_newick("('Homo sapiens','Pan troglodytes');").unwrap();
        assert_eq!(write_newick(&tree), "(Homo_sapiens,Pan_troglodytes);");
    }

    #[test]
    fn missing_lengths_write_zero() {
        let tree = parse_newick("(A:1,B);").unwrap();
        assert_eq!(write_newick(&tree), "(A:1,B:0);");
    }

    #[test]
    fn internal_labels_follow_the_tree_flag() {
        let mut tree = parse_newick("((A,B)X,C);").unwrap();
        tree.set_internal_labels(false);
        assert_eq!(write_newick(&tree), "((A,B),C);");
    }

    #[test]
    fn edge_lengths_follow_the_tree_flag() {
        let mut tree = parse_newick("(A:1,B:2):3;").unwrap();
        assert_eq!(write_newick(&tree), "(A:1,B:2):3;");
        tree.set_edge_lengths(false);
        assert_eq!(write_newick(&tree), "(A,B);");
    }

    #[test]
    fn subtree_omits_its_own_length() {
        let tree = parse_newick("((A:1,B:2)X:3,C:4)R;").unwrap();
        let x = tree.first_child(tree.root().unwrap()).unwrap();
        assert_eq!(write_subtree(&tree, x).unwrap(), "(A:1,B:2)X;");
        let a = tree.first_child(x).unwrap();
        assert_eq!(write_subtree(&tree, a).unwrap(), "A;");
    }

    #[test]
    fn empty_tree_and_display() {
        assert_eq!(write_newick(&Tree::new()), ";");
        let tree = parse_newick("(A,B);").unwrap();
        assert_eq!(tree.to_string(), "(A,B);");
    }
}
