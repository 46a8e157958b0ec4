//! Shared primitives used by the scanner, the parser and the AST

pub mod span;

pub use span::{merge, point, Location, Position, SourceMap, Spanned};
