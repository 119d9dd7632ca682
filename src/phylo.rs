pub(crate) mod draw;
mod edit;
pub(crate) mod node;
pub(crate) mod tree;
