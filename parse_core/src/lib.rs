//! Reentrant scanner and location-tracking parser core
//!
//! A [`Scanner`](lexical::Scanner) borrows one input buffer and owns all of
//! its lexical state. The [`ParserDriver`](syntax::ParserDriver) pulls
//! tokens from it, merges child locations into every node it builds and
//! returns one owned [`Node`](grammar::ast::Node) tree plus diagnostics.

#[macro_use]
pub mod logging;

pub mod batch;
pub mod config;
pub mod grammar;
pub mod lexical;
pub mod source;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use config::RuntimeConfig;
pub use grammar::ast::{make_node, make_sequence, Node, NodeKind, NodeSequence};
pub use lexical::{LexicalError, Scanner};
pub use source::{InputError, SourceBuffer};
pub use syntax::{
    parse_buffer, parse_bytes, parse_str, parse_with_config, parse_with_preferences, Diagnostic,
    ParseError, ParseOutput, ParserDriver, SyntaxError,
};
pub use tokens::{Token, TokenKind};
pub use utils::{merge, point, Location, Position};
