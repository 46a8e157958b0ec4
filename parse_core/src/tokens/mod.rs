//! Token types and the lookahead stream the parser reads from

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenKind, TokenValue};
pub use token_stream::TokenStream;
