use super::super::TreeFloat;
use super::super::parsers::newick::writer::write_newick;
use super::node::{Node, NodeId};
use slotmap::SlotMap;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// A rooted, possibly polytomous tree.
///
/// The tree owns every node in an arena. Structural links are arena keys,
/// so a key of a discarded node can never resolve to a different live node.
///
/// Leaf/internal counts and per-node weights are patched by the structural
/// editor along the path it touches and fully restored by [`Tree::update`].
/// The indexed node list and the label lookup are a cache: they reflect the
/// tree as it was at the last [`Tree::make_node_list`] (or [`Tree::reset`])
/// and are dropped by every structural edit.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
    leaves: usize,
    internals: usize,
    node_list: Option<NodeList>,
    name: String,
    weight: TreeFloat,
    rooted: bool,
    has_edge_lengths: bool,
    has_internal_labels: bool,
    max_depth: usize,
    max_height: usize,
    max_path_length: TreeFloat,
}

#[derive(Debug, Clone, Default)]
struct NodeList {
    nodes: Vec<NodeId>,
    leaf_list: HashMap<String, usize>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node with NodeId: {0} does not exist.")]
    NodeNotFound(NodeId),
    #[error("Node {0} is already part of the tree.")]
    NodeAttached(NodeId),
    #[error("Node {0} is not part of the tree.")]
    NodeDetached(NodeId),
    #[error("Cannot remove the root ({0}) of a tree with more than one node.")]
    CannotRemoveRoot(NodeId),
    #[error("Node {0} cannot be inserted below itself.")]
    SameNode(NodeId),
    #[error("Node list is stale; rebuild it with make_node_list().")]
    StaleNodeList,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            leaves: 0,
            internals: 0,
            node_list: None,
            name: String::new(),
            weight: 1.0,
            rooted: false,
            has_edge_lengths: false,
            has_internal_labels: false,
            max_depth: 0,
            max_height: 0,
            max_path_length: 0.0,
        }
    }
}

/// Iterator over the children of a node, left to right.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.nodes.get(current).and_then(|n| n.sibling);
        Some(current)
    }
}

impl Tree {
    // =========================================================================
    // Construction
    // =========================================================================

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node to the arena. It becomes part of the tree only
    /// once it is spliced in with [`Tree::add_node_below`] or planted.
    pub fn new_node(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    /// Adds a detached leaf labelled `label`.
    pub fn new_leaf<'a>(&mut self, label: impl Into<&'a str>) -> NodeId {
        self.new_node(Node::leaf(label))
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub(crate) fn set_counts(&mut self, leaves: usize, internals: usize) {
        self.leaves = leaves;
        self.internals = internals;
    }

    pub(crate) fn remove_from_arena(&mut self, node_id: NodeId) -> Option<Node> {
        self.nodes.remove(node_id)
    }

    pub(crate) fn invalidate_node_list(&mut self) {
        self.node_list = None;
    }

    // =========================================================================
    // Tree Properties
    // =========================================================================

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    pub fn internal_count(&self) -> usize {
        self.internals
    }

    pub fn node_count(&self) -> usize {
        self.leaves + self.internals
    }

    pub(crate) fn increment_counts(&mut self, leaves: usize, internals: usize) {
        self.leaves += leaves;
        self.internals += internals;
    }

    pub(crate) fn decrement_counts(&mut self, leaves: usize, internals: usize) {
        self.leaves = self.leaves.saturating_sub(leaves);
        self.internals = self.internals.saturating_sub(internals);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<'a>(&mut self, name: impl Into<&'a str>) {
        self.name = name.into().to_string();
    }

    /// Tree-level multiplier, e.g. bootstrap support. Defaults to 1.0.
    pub fn weight(&self) -> TreeFloat {
        self.weight
    }

    pub fn set_weight(&mut self, weight: TreeFloat) {
        self.weight = weight;
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    pub fn set_rooted(&mut self, rooted: bool) {
        self.rooted = rooted;
    }

    pub fn has_edge_lengths(&self) -> bool {
        self.has_edge_lengths
    }

    /// Controls whether the writer emits `:length` suffixes.
    pub fn set_edge_lengths(&mut self, on: bool) {
        self.has_edge_lengths = on;
    }

    pub fn has_internal_labels(&self) -> bool {
        self.has_internal_labels
    }

    /// Controls whether the writer emits labels of internal nodes.
    pub fn set_internal_labels(&mut self, on: bool) {
        self.has_internal_labels = on;
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub(crate) fn get(&self, node_id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(node_id).ok_or(TreeError::NodeNotFound(node_id))
    }

    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(node_id).ok_or(TreeError::NodeNotFound(node_id))
    }

    pub fn label(&self, node_id: NodeId) -> Option<&str> {
        self.nodes.get(node_id).map(|n| n.label())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id)?.parent
    }

    pub fn first_child(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id)?.child
    }

    pub fn sibling(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id)?.sibling
    }

    pub fn children(&self, node_id: NodeId) -> Children<'_> {
        Children { tree: self, next: self.first_child(node_id) }
    }

    pub fn child_ids(&self, node_id: NodeId) -> Vec<NodeId> {
        self.children(node_id).collect()
    }

    /// True if `node_id` is reached from its parent through the child link.
    pub fn is_first_child(&self, node_id: NodeId) -> bool {
        match self.parent(node_id) {
            Some(parent_id) => self.first_child(parent_id) == Some(node_id),
            None => false,
        }
    }

    /// The sibling immediately to the left of `node_id`, if any.
    pub fn left_sibling_of(&self, node_id: NodeId) -> Option<NodeId> {
        let parent_id = self.parent(node_id)?;
        let mut q = self.first_child(parent_id)?;
        if q == node_id {
            return None;
        }
        while let Some(next) = self.sibling(q) {
            if next == node_id {
                return Some(q);
            }
            q = next;
        }
        None
    }

    pub fn rightmost_sibling(&self, node_id: NodeId) -> NodeId {
        let mut p = node_id;
        while let Some(next) = self.sibling(p) {
            p = next;
        }
        p
    }

    /// True if `node_id` lies in the subtree of the first child of `q`.
    pub fn is_left_descendant_of(&self, node_id: NodeId, q: NodeId) -> bool {
        let Some(left) = self.first_child(q) else {
            return false;
        };
        let mut r = Some(node_id);
        while let Some(current) = r {
            if current == left {
                return true;
            }
            if current == q {
                return false;
            }
            r = self.parent(current);
        }
        false
    }

    /// Leftmost and rightmost leaves below an internal node.
    pub fn span(&self, node_id: NodeId) -> Option<(NodeId, NodeId)> {
        let mut left = self.first_child(node_id)?;
        while let Some(child) = self.first_child(left) {
            left = child;
        }
        let mut right = self.rightmost_sibling(self.first_child(node_id)?);
        while let Some(child) = self.first_child(right) {
            right = self.rightmost_sibling(child);
        }
        Some((left, right))
    }

    /// Walks parent links up from `node_id` and reports whether the top is
    /// the root of this tree.
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        if !self.contains(node_id) {
            return false;
        }
        let mut top = node_id;
        while let Some(parent_id) = self.parent(top) {
            top = parent_id;
        }
        Some(top) == self.root
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Nodes of the subtree at `node_id`, parents before children, children
    /// left to right.
    pub fn preorder_from(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            order.push(current);
            let mut children = self.child_ids(current);
            children.reverse();
            stack.extend(children);
        }
        order
    }

    /// Nodes of the subtree at `node_id`, children (left to right) before
    /// their parent.
    pub fn postorder_from(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            order.push(current);
            stack.extend(self.children(current));
        }
        order.reverse();
        order
    }

    pub fn preorder(&self) -> Vec<NodeId> {
        self.root.map(|r| self.preorder_from(r)).unwrap_or_default()
    }

    pub fn postorder(&self) -> Vec<NodeId> {
        self.root.map(|r| self.postorder_from(r)).unwrap_or_default()
    }

    /// Leaves in left-to-right order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.preorder().into_iter().filter(|&id| self.first_child(id).is_none()).collect()
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    /// Recomputes weight, degree and the leaf flag bottom-up, and returns the
    /// `(leaves, internals)` counts of the subtree at `node_id`.
    pub(crate) fn update_subtree(&mut self, node_id: NodeId) -> (usize, usize) {
        let mut leaves = 0;
        let mut internals = 0;
        for id in self.postorder_from(node_id) {
            let mut weight = 0;
            let mut degree = 0;
            let mut child = self.nodes[id].child;
            while let Some(child_id) = child {
                weight += self.nodes[child_id].weight;
                degree += 1;
                child = self.nodes[child_id].sibling;
            }
            let node = &mut self.nodes[id];
            node.degree = degree;
            node.leaf = degree == 0;
            if node.leaf {
                node.weight = 1;
                leaves += 1;
            } else {
                node.weight = weight;
                internals += 1;
            }
        }
        (leaves, internals)
    }

    /// Restores weight, degree, leaf flags and the leaf/internal counts from
    /// the current shape. Labels and leaf numbers are left untouched.
    pub fn update(&mut self) {
        let (leaves, internals) = match self.root {
            Some(root) => self.update_subtree(root),
            None => (0, 0),
        };
        self.leaves = leaves;
        self.internals = internals;
    }

    /// Renumbers leaves left to right, rebuilds the node list and updates
    /// all derived counts.
    pub fn reset(&mut self) {
        let order = self.postorder();
        let mut leaf_number = 0;
        for id in order {
            let node = &mut self.nodes[id];
            node.weight = 0;
            node.degree = 0;
            node.index = 0;
            node.leaf_number = 0;
            if node.child.is_none() {
                leaf_number += 1;
                node.leaf_number = leaf_number;
            }
        }
        self.update();
        self.make_node_list();
    }

    /// Rebuilds the indexed node list and the leaf label lookup.
    ///
    /// Leaves occupy `[0, leaves)` ordered by leaf number; internal nodes
    /// follow in postorder. Node counts are recomputed from the shape.
    pub fn make_node_list(&mut self) {
        let order = self.postorder();
        let mut leaf_ids: Vec<NodeId> = Vec::new();
        let mut internal_ids: Vec<NodeId> = Vec::new();
        for &id in &order {
            if self.nodes[id].child.is_none() {
                leaf_ids.push(id);
            } else {
                internal_ids.push(id);
            }
        }
        leaf_ids.sort_by_key(|&id| self.nodes[id].leaf_number);

        let mut list = NodeList {
            nodes: Vec::with_capacity(order.len()),
            leaf_list: HashMap::with_capacity(leaf_ids.len()),
        };
        for (index, &id) in leaf_ids.iter().chain(internal_ids.iter()).enumerate() {
            let node = &mut self.nodes[id];
            node.index = index;
            if index < leaf_ids.len() {
                let _ = list.leaf_list.insert(node.label.clone(), index);
            }
            list.nodes.push(id);
        }

        self.leaves = leaf_ids.len();
        self.internals = internal_ids.len();
        self.node_list = Some(list);
    }

    pub fn has_node_list(&self) -> bool {
        self.node_list.is_some()
    }

    /// The node at position `index` of the node list.
    pub fn node_at(&self, index: usize) -> Result<Option<NodeId>, TreeError> {
        let list = self.node_list.as_ref().ok_or(TreeError::StaleNodeList)?;
        Ok(list.nodes.get(index).copied())
    }

    pub fn node_list(&self) -> Result<&[NodeId], TreeError> {
        self.node_list.as_ref().map(|l| l.nodes.as_slice()).ok_or(TreeError::StaleNodeList)
    }

    /// Looks up a leaf by label through the node list.
    pub fn leaf_with_label<'a>(&self, label: impl Into<&'a str>) -> Result<Option<NodeId>, TreeError> {
        let list = self.node_list.as_ref().ok_or(TreeError::StaleNodeList)?;
        Ok(list.leaf_list.get(label.into()).and_then(|&i| list.nodes.get(i).copied()))
    }

    // =========================================================================
    // Derived Statistics
    // =========================================================================

    /// Sets every node's depth (edges from the root) and records the maximum.
    pub fn compute_node_depths(&mut self) {
        self.max_depth = 0;
        for id in self.preorder() {
            let depth = match self.nodes[id].parent {
                Some(parent_id) => self.nodes[parent_id].depth + 1,
                None => 0,
            };
            self.nodes[id].depth = depth;
            self.max_depth = self.max_depth.max(depth);
        }
    }

    pub fn max_node_depth(&mut self) -> usize {
        self.compute_node_depths();
        self.max_depth
    }

    /// Sets every node's path length from the root and returns the maximum.
    /// Negative and vanishing edge lengths count as zero.
    pub fn compute_path_lengths(&mut self) -> TreeFloat {
        self.max_path_length = 0.0;
        for id in self.preorder() {
            let path_length = match self.nodes[id].parent {
                Some(parent_id) => {
                    let mut length = self.nodes[id].edge_length.unwrap_or(0.0);
                    if length < 0.000001 {
                        length = 0.0;
                    }
                    self.nodes[parent_id].path_length + length
                }
                None => 0.0,
            };
            self.nodes[id].path_length = path_length;
            self.max_path_length = self.max_path_length.max(path_length);
        }
        self.max_path_length
    }

    /// Sets every node's display height to `leaves - weight` and returns the
    /// maximum. Weights are taken as they are; run [`Tree::update`] first if
    /// the tree was edited.
    pub fn compute_node_heights(&mut self) -> usize {
        self.max_height = 0;
        let leaves = self.leaves;
        for id in self.preorder() {
            let height = leaves.saturating_sub(self.nodes[id].weight);
            self.nodes[id].height = height;
            self.max_height = self.max_height.max(height);
        }
        self.max_height
    }

    pub fn mark_nodes(&mut self, on: bool) {
        for id in self.preorder() {
            self.nodes[id].marked = on;
        }
    }
}

/// Panics if `node_id` is not in the arena, e.g. after [`Tree::discard`].
/// Use [`Tree::node`] to look a node up without panicking.
impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, node_id: NodeId) -> &Self::Output {
        &self.nodes[node_id]
    }
}

/// Panics if `node_id` is not in the arena.
impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, node_id: NodeId) -> &mut Self::Output {
        &mut self.nodes[node_id]
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", write_newick(self))
    }
}
