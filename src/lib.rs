// -------------------------------------
// #![allow(dead_code)]
// #![allow(unused_variables)]
// #![allow(clippy::too_many_arguments)]
// -------------------------------------

mod parsers;
mod phylo;

pub type TreeFloat = f64;
pub type TreeInt = i32;

pub use parsers::ReadError;
pub use parsers::newick::ParseError;
pub use parsers::newick::ParseErrorKind;
pub use parsers::newick::labels::nexus_string;
pub use parsers::newick::labels::nexus_to_display;
pub use parsers::newick::labels::replace_character;
pub use parsers::newick::lexer::NewickLexer;
pub use parsers::newick::lexer::TokenKind;
pub use parsers::newick::lexer::TokenSource;
pub use parsers::newick::parse_newick;
pub use parsers::newick::parse_with;
pub use parsers::newick::writer::write_newick;
pub use parsers::newick::writer::write_subtree;
pub use parsers::parse_trees;
pub use parsers::read_tree;
pub use parsers::read_trees;
pub use phylo::draw::Glyphs;
pub use phylo::node::Node;
pub use phylo::node::NodeId;
pub use phylo::tree::Children;
pub use phylo::tree::Tree;
pub use phylo::tree::TreeError;
