pub(crate) mod labels;
pub(crate) mod lexer;
pub(crate) mod writer;

use super::super::TreeFloat;
use super::super::phylo::node::{Node, NodeId};
use super::super::phylo::tree::Tree;
use lexer::{NewickLexer, TokenKind, TokenSource};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Syntax error")]
    Syntax,
    #[error("Unexpected end of string")]
    UnexpectedEnd,
    #[error("Missing '('")]
    MissingOpenParen,
    #[error("Unbalanced parentheses")]
    Unbalanced,
    #[error("Stack not empty")]
    StackNotEmpty,
    #[error("Expecting a semicolon")]
    MissingSemicolon,
}

impl ParseErrorKind {
    /// Numeric error code, 1 (`Syntax`) through 6 (`MissingSemicolon`).
    pub fn code(&self) -> i32 {
        match self {
            ParseErrorKind::Syntax => 1,
            ParseErrorKind::UnexpectedEnd => 2,
            ParseErrorKind::MissingOpenParen => 3,
            ParseErrorKind::Unbalanced => 4,
            ParseErrorKind::StackNotEmpty => 5,
            ParseErrorKind::MissingSemicolon => 6,
        }
    }
}

/// A rejected tree description: what went wrong and the byte offset of the
/// token at which it was detected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub(crate) fn offset_by(self, offset: usize) -> Self {
        Self { position: self.position + offset, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    GetName,
    GetInternode,
    NextMove,
    FinishChildren,
}

/// Parses a single tree description terminated by `;`.
pub fn parse_newick<'a>(s: impl Into<&'a str>) -> Result<Tree, ParseError> {
    let mut lexer = NewickLexer::new(s.into());
    parse_with(&mut lexer)
}

/// Runs the Newick grammar automaton over any token source.
///
/// Nodes are created as the description is read: `(` opens a child of the
/// current node and pushes the current node onto the ancestor stack, `,`
/// opens a sibling under the node on top of the stack, and `)` pops the
/// stack. Leaf weights are folded into their ancestors as groups close.
pub fn parse_with<S: TokenSource>(source: &mut S) -> Result<Tree, ParseError> {
    let mut builder = Builder::new();
    let mut state = State::GetName;
    let mut token = source.next_token();

    loop {
        match state {
            State::GetName => match token {
                t if t.is_whitespace() => token = source.next_token(),
                TokenKind::String | TokenKind::Number => {
                    builder.make_current_a_leaf(source.current_text());
                    token = source.next_token();
                    state = State::GetInternode;
                }
                TokenKind::LPar => state = State::NextMove,
                TokenKind::EndOfString => {
                    return Err(fail(source, ParseErrorKind::UnexpectedEnd));
                }
                _ => return Err(fail(source, ParseErrorKind::Syntax)),
            },

            State::GetInternode => match token {
                t if t.is_whitespace() => token = source.next_token(),
                TokenKind::Colon | TokenKind::Comma | TokenKind::RPar => {
                    state = State::NextMove
                }
                TokenKind::Semicolon if builder.stack.is_empty() => {
                    state = State::NextMove
                }
                TokenKind::Semicolon => {
                    return Err(fail(source, ParseErrorKind::Unbalanced));
                }
                TokenKind::EndOfString => {
                    return Err(fail(source, ParseErrorKind::UnexpectedEnd));
                }
                _ => return Err(fail(source, ParseErrorKind::Syntax)),
            },

            State::NextMove => match token {
                TokenKind::Colon => {
                    let length = read_edge_length(source)?;
                    builder.set_edge_length(length);
                    token = source.next_token();
                }
                t if t.is_whitespace() => token = source.next_token(),
                TokenKind::Comma => {
                    builder
                        .make_sibling()
                        .map_err(|kind| fail(source, kind))?;
                    state = State::GetName;
                    token = source.next_token();
                }
                TokenKind::LPar => {
                    builder.make_child();
                    token = source.next_token();
                    state = State::GetName;
                }
                TokenKind::RPar => {
                    builder.close_group().map_err(|kind| fail(source, kind))?;
                    state = State::FinishChildren;
                    token = source.next_token();
                }
                TokenKind::Semicolon if builder.stack.is_empty() => break,
                TokenKind::Semicolon => {
                    return Err(fail(source, ParseErrorKind::StackNotEmpty));
                }
                TokenKind::EndOfString => {
                    return Err(fail(source, ParseErrorKind::UnexpectedEnd));
                }
                _ => return Err(fail(source, ParseErrorKind::Syntax)),
            },

            State::FinishChildren => match token {
                TokenKind::String | TokenKind::Number => {
                    builder.set_internal_label(source.current_text());
                    token = source.next_token();
                }
                TokenKind::Colon => {
                    let length = read_edge_length(source)?;
                    builder.set_edge_length(length);
                    token = source.next_token();
                }
                t if t.is_whitespace() => token = source.next_token(),
                TokenKind::RPar => {
                    builder.close_group().map_err(|kind| fail(source, kind))?;
                    token = source.next_token();
                }
                TokenKind::Comma => {
                    builder
                        .make_sibling()
                        .map_err(|kind| fail(source, kind))?;
                    state = State::GetName;
                    token = source.next_token();
                }
                TokenKind::Semicolon => state = State::NextMove,
                _ if builder.stack.is_empty() => {
                    return Err(fail(source, ParseErrorKind::MissingSemicolon));
                }
                _ => return Err(fail(source, ParseErrorKind::Syntax)),
            },
        }
    }

    Ok(builder.finish())
}

fn fail<S: TokenSource>(source: &S, kind: ParseErrorKind) -> ParseError {
    let error = ParseError::new(kind, source.current_position());
    debug!(%error, token = source.current_text(), "newick parse failed");
    error
}

/// Reads the number following a `:`. Whitespace between the colon and the
/// number is skipped.
fn read_edge_length<S: TokenSource>(
    source: &mut S,
) -> Result<TreeFloat, ParseError> {
    let mut token = source.next_token();
    while token.is_whitespace() {
        token = source.next_token();
    }
    match token {
        TokenKind::Number => source
            .current_text()
            .parse::<TreeFloat>()
            .map_err(|_| fail(source, ParseErrorKind::Syntax)),
        TokenKind::EndOfString => Err(fail(source, ParseErrorKind::UnexpectedEnd)),
        _ => Err(fail(source, ParseErrorKind::Syntax)),
    }
}

/// Tree under construction plus the stack of currently open ancestors.
struct Builder {
    tree: Tree,
    stack: Vec<NodeId>,
    current: NodeId,
    leaves: usize,
    internals: usize,
}

impl Builder {
    fn new() -> Self {
        let mut tree = Tree::new();
        let current = tree.new_node(Node::new());
        tree.set_root(Some(current));
        Self { tree, stack: Vec::new(), current, leaves: 0, internals: 0 }
    }

    fn make_current_a_leaf(&mut self, label: &str) {
        self.leaves += 1;
        let node = &mut self.tree[self.current];
        node.leaf = true;
        node.leaf_number = self.leaves;
        node.weight = 1;
        node.degree = 0;
        node.label = label.to_string();
    }

    fn set_edge_length(&mut self, length: TreeFloat) {
        self.tree[self.current].edge_length = Some(length);
        self.tree.set_edge_lengths(true);
    }

    fn set_internal_label(&mut self, label: &str) {
        self.tree[self.current].label = label.to_string();
        self.tree.set_internal_labels(true);
    }

    fn make_child(&mut self) {
        self.internals += 1;
        self.stack.push(self.current);
        let child = self.tree.new_node(Node { parent: Some(self.current), ..Node::new() });
        let node = &mut self.tree[self.current];
        node.child = Some(child);
        node.degree += 1;
        self.current = child;
    }

    fn make_sibling(&mut self) -> Result<(), ParseErrorKind> {
        let &ancestor = self.stack.last().ok_or(ParseErrorKind::MissingOpenParen)?;
        let sibling = self.tree.new_node(Node { parent: Some(ancestor), ..Node::new() });
        self.tree[self.current].sibling = Some(sibling);
        let weight = self.tree[self.current].weight;
        let ancestor = &mut self.tree[ancestor];
        ancestor.weight += weight;
        ancestor.degree += 1;
        self.current = sibling;
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), ParseErrorKind> {
        let ancestor = self.stack.pop().ok_or(ParseErrorKind::Unbalanced)?;
        let weight = self.tree[self.current].weight;
        self.tree[ancestor].weight += weight;
        self.current = ancestor;
        Ok(())
    }

    fn finish(mut self) -> Tree {
        if let Some(root) = self.tree.root() {
            self.tree[root].weight = self.leaves;
        }
        self.tree.set_counts(self.leaves, self.internals);
        self.tree.make_node_list();
        self.tree
    }
}
