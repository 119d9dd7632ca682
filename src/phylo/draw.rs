use super::node::NodeId;
use super::tree::Tree;

/// Line-drawing characters used by [`Tree::draw_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    /// Horizontal run of an edge.
    pub hbar: char,
    /// Vertical run passing a junction.
    pub vbar: char,
    /// Link from a junction to a middle child.
    pub sib: char,
    /// Link from a junction to its first child.
    pub left: char,
    /// Link from a junction to its last child.
    pub right: char,
    /// End of an interior edge at its junction.
    pub tee: char,
}

impl Glyphs {
    pub const ASCII: Glyphs =
        Glyphs { hbar: '-', vbar: '|', sib: '+', left: '+', right: '+', tee: '|' };

    pub const BOX: Glyphs =
        Glyphs { hbar: '─', vbar: '│', sib: '├', left: '┌', right: '└', tee: '┤' };
}

impl Default for Glyphs {
    fn default() -> Self {
        Glyphs::ASCII
    }
}

impl Tree {
    /// Renders the tree as text with [`Glyphs::ASCII`], one line per leaf
    /// plus one per labelled junction.
    pub fn draw(&mut self) -> String {
        self.draw_with(&Glyphs::ASCII)
    }

    /// Renders the tree as text with the given glyph set.
    ///
    /// Weights are recomputed first, then every node's display height is set
    /// to `leaves - weight`. Columns of the drawing are heights: the root sits
    /// in column 0 and every leaf in column `leaves - 1`.
    pub fn draw_with(&mut self, glyphs: &Glyphs) -> String {
        let Some(root) = self.root() else {
            return "(No tree)\n".to_string();
        };
        self.update();
        let _ = self.compute_node_heights();

        let mut renderer = Renderer::new(self, root, glyphs);
        renderer.render();
        renderer.output
    }
}

/// Scratch state of a single drawing pass.
struct Renderer<'a> {
    tree: &'a Tree,
    root: NodeId,
    glyphs: &'a Glyphs,
    line: Vec<char>,
    output: String,
}

impl<'a> Renderer<'a> {
    fn new(tree: &'a Tree, root: NodeId, glyphs: &'a Glyphs) -> Self {
        Self {
            tree,
            root,
            glyphs,
            line: vec![' '; tree.leaf_count() + 2],
            output: String::new(),
        }
    }

    fn height(&self, node_id: NodeId) -> usize {
        self.tree[node_id].height()
    }

    fn put(&mut self, column: usize, c: char) {
        if let Some(slot) = self.line.get_mut(column) {
            *slot = c;
        }
    }

    /// Children first, then the node's own edge.
    fn render(&mut self) {
        let tree = self.tree;
        for node_id in tree.postorder_from(self.root) {
            if tree[node_id].is_leaf() {
                self.pendant_edge(node_id);
            }
            if tree.sibling(node_id).is_some() {
                self.interior_edge(node_id);
            }
        }
    }

    /// Edge from a leaf to its parent.
    fn pendant_edge(&mut self, p: NodeId) {
        let Some(q) = self.tree.parent(p) else {
            self.put(0, self.glyphs.hbar);
            self.flush(p, 0, true);
            return;
        };

        let start = self.height(q);
        let stop = self.height(p);
        for column in start + 1..=stop {
            self.put(column, self.glyphs.hbar);
        }
        let symbol = if self.tree.is_first_child(p) {
            self.glyphs.left
        } else if self.tree.sibling(p).is_some() {
            self.glyphs.sib
        } else {
            self.glyphs.right
        };
        self.put(start, symbol);
        self.fill_in_ancestors(p);
        self.flush(p, stop, true);
    }

    /// Junction row of `p`'s parent. Drawn once per child that has a
    /// sibling; the first such row carries the edge into the parent.
    fn interior_edge(&mut self, p: NodeId) {
        let Some(r) = self.tree.parent(p) else {
            return;
        };
        let stop = self.height(r);
        let first = self.tree.is_first_child(p);

        if first {
            self.put(stop, self.glyphs.tee);
            if let Some(grandparent) = self.tree.parent(r) {
                let start = self.height(grandparent);
                for column in start + 1..stop {
                    self.put(column, self.glyphs.hbar);
                }
                let symbol = if start == stop {
                    self.glyphs.vbar
                } else if self.tree.is_first_child(r) {
                    self.glyphs.left
                } else if self.tree.sibling(r).is_some() {
                    self.glyphs.sib
                } else {
                    self.glyphs.right
                };
                self.put(start, symbol);
                self.fill_in_ancestors(r);
            }
        } else {
            self.put(stop, self.glyphs.vbar);
            if let Some(next) = self.tree.sibling(p) {
                self.fill_in_ancestors(next);
            }
        }

        // The root has no incoming edge; its junction rows only carry a label.
        if r == self.root && self.tree[r].label().is_empty() {
            self.clear();
            return;
        }
        self.flush(r, stop, first);
    }

    /// Puts vertical bars at the columns of every ancestor junction that
    /// the branch above `p` passes under.
    fn fill_in_ancestors(&mut self, p: NodeId) {
        let mut r = p;
        let mut q = self.tree.parent(p);
        while let Some(q_id) = q {
            if q_id == self.root {
                break;
            }
            let Some(above) = self.tree.parent(q_id) else {
                break;
            };
            let r_first = self.tree.is_first_child(r);
            let passes_under = (self.tree.sibling(q_id).is_some() && !r_first)
                || (!self.tree.is_first_child(q_id) && r_first);
            if passes_under {
                let column = self.height(above);
                if r == p && self.height(q_id) == column {
                    self.put(column, self.glyphs.sib);
                } else {
                    self.put(column, self.glyphs.vbar);
                }
            }
            r = q_id;
            q = Some(above);
        }
    }

    /// Emits columns `0..=stop` followed by the node's label and clears the
    /// buffer. Internal labels appear only on the row of the first child.
    fn flush(&mut self, node_id: NodeId, stop: usize, first_child: bool) {
        let end = (stop + 1).min(self.line.len());
        self.output.extend(self.line[..end].iter());
        let node = &self.tree[node_id];
        if node.is_leaf() {
            self.output.push(' ');
            self.output.push_str(node.label());
        } else if first_child && !node.label().is_empty() {
            self.output.push_str(node.label());
        }
        self.output.push('\n');
        self.clear();
    }

    fn clear(&mut self) {
        self.line.fill(' ');
    }
}
