use super::node::{Node, NodeId};
use super::tree::{Tree, TreeError};
use slotmap::SecondaryMap;
use tracing::{debug, instrument};

/// Node fields and child order captured from a subtree, parents first.
type SubtreeCopy = Vec<(NodeId, Node, Vec<NodeId>)>;

impl Tree {
    // =========================================================================
    // Structural Editing
    // =========================================================================

    /// Inserts a new unlabelled internal node between `below_id` and its
    /// parent. The detached subtree at `node_id` becomes the new node's first
    /// child and `below_id` its second. Returns the new internal node.
    ///
    /// Weights along the path to the root are patched; leaf numbers and the
    /// node list are not.
    #[instrument(level = "trace", skip(self))]
    pub fn add_node_below(
        &mut self,
        node_id: NodeId,
        below_id: NodeId,
    ) -> Result<NodeId, TreeError> {
        if node_id == below_id {
            return Err(TreeError::SameNode(node_id));
        }
        let node = self.get(node_id)?;
        if node.parent.is_some() || self.root() == Some(node_id) {
            return Err(TreeError::NodeAttached(node_id));
        }
        if !self.is_attached(below_id) {
            return Err(TreeError::NodeDetached(below_id));
        }

        let _ = self.update_subtree(node_id);
        let node_weight = self.get(node_id)?.weight;
        let node_is_leaf = self.get(node_id)?.leaf;

        let below = self.get(below_id)?;
        let below_weight = below.weight;
        let below_sibling = below.sibling;
        let q = below.parent;
        let left = match q {
            Some(_) if !self.is_first_child(below_id) => self.left_sibling_of(below_id),
            _ => None,
        };

        let ancestor_id = self.new_node(Node {
            child: Some(node_id),
            sibling: below_sibling,
            parent: q,
            degree: 2,
            weight: node_weight + below_weight,
            ..Node::default()
        });

        {
            let node = self.get_mut(node_id)?;
            node.parent = Some(ancestor_id);
            node.sibling = Some(below_id);
        }
        {
            let below = self.get_mut(below_id)?;
            below.parent = Some(ancestor_id);
            below.sibling = None;
        }

        match (q, left) {
            (None, _) => self.set_root(Some(ancestor_id)),
            (Some(q), None) => self.get_mut(q)?.child = Some(ancestor_id),
            (Some(_), Some(r)) => self.get_mut(r)?.sibling = Some(ancestor_id),
        }

        let mut up = q;
        while let Some(id) = up {
            let ancestor = self.get_mut(id)?;
            ancestor.weight += node_weight;
            up = ancestor.parent;
        }

        self.increment_counts(usize::from(node_is_leaf), 1);
        self.invalidate_node_list();
        debug!(%node_id, %below_id, %ancestor_id, "added node below");
        Ok(ancestor_id)
    }

    /// Detaches `node_id` (with its subtree) from the tree.
    ///
    /// - The only node of the tree: the tree becomes empty, returns `None`.
    /// - Parent of degree 2: the parent is collapsed and the surviving
    ///   sibling takes its place under the grandparent; returns the sibling.
    /// - Otherwise only the node is unlinked and the parent's degree drops by
    ///   one; returns the new first child, or the left sibling of the
    ///   removed node.
    ///
    /// The detached node stays in the arena and may be re-inserted with
    /// [`Tree::add_node_below`] or freed with [`Tree::discard`].
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(
        &mut self,
        node_id: NodeId,
    ) -> Result<Option<NodeId>, TreeError> {
        let node = self.get(node_id)?;
        let node_weight = node.weight;
        let node_is_leaf = node.child.is_none();

        if self.root() == Some(node_id) {
            if !node_is_leaf {
                return Err(TreeError::CannotRemoveRoot(node_id));
            }
            self.get_mut(node_id)?.parent = None;
            self.set_root(None);
            self.set_counts(0, 0);
            self.invalidate_node_list();
            debug!(%node_id, "removed the only node");
            return Ok(None);
        }
        if !self.is_attached(node_id) {
            return Err(TreeError::NodeDetached(node_id));
        }

        let ancestor_id =
            self.parent(node_id).ok_or(TreeError::NodeDetached(node_id))?;
        let degree = self.children(ancestor_id).count();

        let result = if degree == 2 {
            let survivor = if self.is_first_child(node_id) {
                self.sibling(node_id)
            } else {
                self.first_child(ancestor_id)
            }
            .ok_or(TreeError::NodeNotFound(ancestor_id))?;

            let ancestor = self.get(ancestor_id)?;
            let ancestor_sibling = ancestor.sibling;
            let q = ancestor.parent;
            let left = match q {
                Some(_) if !self.is_first_child(ancestor_id) => {
                    self.left_sibling_of(ancestor_id)
                }
                _ => None,
            };

            self.get_mut(survivor)?.parent = q;
            match (q, left) {
                (None, _) => {
                    self.set_root(Some(survivor));
                    self.get_mut(survivor)?.sibling = None;
                }
                (Some(q), None) => {
                    self.get_mut(q)?.child = Some(survivor);
                    self.get_mut(survivor)?.sibling = ancestor_sibling;
                }
                (Some(_), Some(r)) => {
                    self.get_mut(r)?.sibling = Some(survivor);
                    self.get_mut(survivor)?.sibling = ancestor_sibling;
                }
            }

            let _ = self.remove_from_arena(ancestor_id);
            self.decrement_counts(usize::from(node_is_leaf), 1);
            self.patch_weights_from(q, node_weight)?;
            Some(survivor)
        } else {
            let next = self.sibling(node_id);
            let replacement = if self.is_first_child(node_id) {
                self.get_mut(ancestor_id)?.child = next;
                next
            } else {
                let r = self
                    .left_sibling_of(node_id)
                    .ok_or(TreeError::NodeDetached(node_id))?;
                self.get_mut(r)?.sibling = next;
                Some(r)
            };

            self.get_mut(ancestor_id)?.degree = degree - 1;
            self.decrement_counts(usize::from(node_is_leaf), 0);
            self.patch_weights_from(Some(ancestor_id), node_weight)?;
            replacement
        };

        let node = self.get_mut(node_id)?;
        node.parent = None;
        node.sibling = None;
        self.invalidate_node_list();
        debug!(%node_id, degree, "removed node");
        Ok(result)
    }

    fn patch_weights_from(
        &mut self,
        start: Option<NodeId>,
        removed_weight: usize,
    ) -> Result<(), TreeError> {
        let mut up = start;
        while let Some(id) = up {
            let node = self.get_mut(id)?;
            node.weight = node.weight.saturating_sub(removed_weight);
            up = node.parent;
        }
        Ok(())
    }

    // =========================================================================
    // Copying
    // =========================================================================

    fn capture_subtree(&self, rooted_at: NodeId) -> Result<SubtreeCopy, TreeError> {
        let _ = self.get(rooted_at)?;
        Ok(self
            .preorder_from(rooted_at)
            .into_iter()
            .map(|id| (id, self.nodes_copy(id), self.child_ids(id)))
            .collect())
    }

    fn nodes_copy(&self, node_id: NodeId) -> Node {
        self.node(node_id).map(Node::copy_fields).unwrap_or_default()
    }

    fn insert_subtree(&mut self, copies: SubtreeCopy) -> Option<NodeId> {
        let mut new_ids: SecondaryMap<NodeId, NodeId> = SecondaryMap::new();
        let mut links: Vec<(NodeId, Vec<NodeId>)> = Vec::with_capacity(copies.len());
        let mut top = None;

        for (old_id, node, children) in copies {
            let new_id = self.new_node(node);
            let _ = new_ids.insert(old_id, new_id);
            top.get_or_insert(new_id);
            links.push((new_id, children));
        }

        for (new_id, children) in links {
            let children: Vec<NodeId> =
                children.iter().filter_map(|old| new_ids.get(*old).copied()).collect();
            if let Some(node) = self.node_mut(new_id) {
                node.child = children.first().copied();
            }
            for (i, &child_id) in children.iter().enumerate() {
                if let Some(child) = self.node_mut(child_id) {
                    child.parent = Some(new_id);
                    child.sibling = children.get(i + 1).copied();
                }
            }
        }
        top
    }

    /// Deep-copies the subtree at `rooted_at` into a detached subtree of this
    /// tree and returns its root. Labels, leaf flags, edge lengths, indices,
    /// leaf and label numbers are copied; weights, degrees and depths are not
    /// (run `update` after grafting it in).
    #[instrument(level = "trace", skip(self))]
    pub fn copy_of_subtree(&mut self, rooted_at: NodeId) -> Result<NodeId, TreeError> {
        let copies = self.capture_subtree(rooted_at)?;
        self.insert_subtree(copies).ok_or(TreeError::NodeNotFound(rooted_at))
    }

    /// Copies the subtree at `rooted_at` into a new, independent tree with
    /// leaves renumbered and its node list built.
    pub fn extract_subtree(&self, rooted_at: NodeId) -> Result<Tree, TreeError> {
        let copies = self.capture_subtree(rooted_at)?;
        let mut tree = Tree::new();
        tree.set_name(self.name());
        tree.set_weight(self.weight());
        tree.set_rooted(self.is_rooted());
        tree.set_edge_lengths(self.has_edge_lengths());
        tree.set_internal_labels(self.has_internal_labels());
        let root = tree.insert_subtree(copies);
        tree.set_root(root);
        tree.reset();
        Ok(tree)
    }

    /// Replaces the whole tree with the detached subtree at `node_id`. The
    /// previous node graph is freed.
    pub fn plant(&mut self, node_id: NodeId) -> Result<(), TreeError> {
        let node = self.get(node_id)?;
        if node.parent.is_some() || self.root() == Some(node_id) {
            return Err(TreeError::NodeAttached(node_id));
        }
        for id in self.postorder() {
            let _ = self.remove_from_arena(id);
        }
        self.set_root(Some(node_id));
        self.reset();
        Ok(())
    }

    /// Frees a detached subtree and returns the number of nodes released.
    pub fn discard(&mut self, node_id: NodeId) -> Result<usize, TreeError> {
        let node = self.get(node_id)?;
        if node.parent.is_some() || self.root() == Some(node_id) {
            return Err(TreeError::NodeAttached(node_id));
        }
        let ids = self.postorder_from(node_id);
        for &id in &ids {
            let _ = self.remove_from_arena(id);
        }
        Ok(ids.len())
    }
}
