//! AST model and the reference grammar that builds it

pub mod ast;
pub mod builders;
pub mod keywords;

pub use ast::{make_node, make_sequence, Node, NodeKind, NodeSequence};
pub use builders::Parser;
pub use keywords::Keyword;
