use super::super::{TreeFloat, TreeInt};
use slotmap::new_key_type;
use std::fmt::Display;

new_key_type! { pub struct NodeId; }

/// A vertex of a rooted multiway tree.
///
/// Children are stored as a first-child / next-sibling chain: `child` points
/// at the leftmost child and every further child is reached through
/// `sibling`. Links are arena keys owned by the [`Tree`](super::tree::Tree);
/// a node carries state and cheap accessors only.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) child: Option<NodeId>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) label: String,
    pub(crate) edge_length: Option<TreeFloat>,
    pub(crate) weight: usize,
    pub(crate) degree: usize,
    pub(crate) leaf: bool,
    pub(crate) leaf_number: usize,
    pub(crate) label_number: usize,
    pub(crate) index: usize,
    pub(crate) depth: usize,
    pub(crate) height: usize,
    pub(crate) path_length: TreeFloat,
    pub(crate) marked: bool,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) value: TreeInt,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            child: None,
            sibling: None,
            parent: None,
            label: String::new(),
            edge_length: None,
            weight: 0,
            degree: 0,
            leaf: false,
            leaf_number: 0,
            label_number: 0,
            index: 0,
            depth: 0,
            height: 0,
            path_length: 0.0,
            marked: false,
            latitude: 0.0,
            longitude: 0.0,
            value: 0,
        }
    }
}

impl Node {
    pub fn new() -> Self { Self::default() }

    /// A leaf carrying `label`, with weight 1.
    pub fn leaf<'a>(label: impl Into<&'a str>) -> Self {
        Self { label: label.into().to_string(), leaf: true, weight: 1, ..Self::default() }
    }

    pub fn child(&self) -> Option<NodeId> { self.child }
    pub fn sibling(&self) -> Option<NodeId> { self.sibling }
    pub fn parent(&self) -> Option<NodeId> { self.parent }

    pub fn label(&self) -> &str { &self.label }
    pub fn set_label<'a>(&mut self, label: impl Into<&'a str>) { self.label = label.into().to_string(); }
    pub fn append_label<'a>(&mut self, text: impl Into<&'a str>) { self.label.push_str(text.into()); }

    /// Length of the edge connecting this node to its parent.
    pub fn edge_length(&self) -> Option<TreeFloat> { self.edge_length }
    pub fn set_edge_length(&mut self, edge_length: Option<TreeFloat>) { self.edge_length = edge_length; }

    /// Number of leaf descendants; 1 for a leaf. Valid after `Tree::update`.
    pub fn weight(&self) -> usize { self.weight }
    pub fn degree(&self) -> usize { self.degree }
    pub fn is_leaf(&self) -> bool { self.leaf }

    pub fn leaf_number(&self) -> usize { self.leaf_number }
    pub fn label_number(&self) -> usize { self.label_number }
    pub fn set_label_number(&mut self, label_number: usize) { self.label_number = label_number; }
    pub fn index(&self) -> usize { self.index }

    pub fn depth(&self) -> usize { self.depth }
    pub fn height(&self) -> usize { self.height }
    pub fn path_length(&self) -> TreeFloat { self.path_length }

    pub fn is_marked(&self) -> bool { self.marked }
    pub fn set_marked(&mut self, marked: bool) { self.marked = marked; }

    pub fn latitude(&self) -> f64 { self.latitude }
    pub fn set_latitude(&mut self, latitude: f64) { self.latitude = latitude; }
    pub fn longitude(&self) -> f64 { self.longitude }
    pub fn set_longitude(&mut self, longitude: f64) { self.longitude = longitude; }
    pub fn value(&self) -> TreeInt { self.value }
    pub fn set_value(&mut self, value: TreeInt) { self.value = value; }

    /// Copy of the fields carried over when a subtree is cloned. Links and
    /// derived statistics are left at their defaults.
    pub(crate) fn copy_fields(&self) -> Self {
        Self {
            leaf: self.leaf,
            label: self.label.clone(),
            index: self.index,
            leaf_number: self.leaf_number,
            label_number: self.label_number,
            edge_length: self.edge_length,
            ..Self::default()
        }
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self { Node::leaf(value.as_str()) }
}

impl<'a> From<&'a str> for Node {
    fn from(value: &'a str) -> Self { Node::leaf(value) }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}

impl From<NodeId> for String {
    fn from(node_id: NodeId) -> Self { format!("{node_id}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_constructor_sets_weight_and_flag() {
        let node = Node::leaf("Homo sapiens");
        assert!(node.is_leaf());
        assert_eq!(node.weight(), 1);
        assert_eq!(node.label(), "Homo sapiens");
        assert_eq!(node.edge_length(), None);
    }

    #[test]
    fn copy_fields_leaves_derived_state_behind() {
        let mut node = Node::leaf("A");
        node.edge_length = Some(0.5);
        node.leaf_number = 3;
        node.index = 2;
        node.depth = 4;
        node.marked = true;
        node.parent = Some(NodeId::default());

        let copy = node.copy_fields();
        assert_eq!(copy.label(), "A");
        assert_eq!(copy.edge_length(), Some(0.5));
        assert_eq!(copy.leaf_number(), 3);
        assert_eq!(copy.index(), 2);
        assert!(copy.is_leaf());
        assert_eq!(copy.weight(), 0);
        assert_eq!(copy.depth(), 0);
        assert!(!copy.is_marked());
        assert_eq!(copy.parent(), None);
    }
}
