//! Builder functions for grammar productions
//!
//! Builders are free functions over `&mut dyn Parser`. Each one consumes the
//! tokens of its production and returns a [`Node`] whose location merges
//! every consumed token and child node.

pub mod expressions;
pub mod statements;

use crate::grammar::ast::{make_node, Node, NodeKind};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind};
use crate::utils::Location;

pub use expressions::{parse_expression, parse_required_expression};
pub use statements::{parse_block, parse_program, parse_statement, parse_statement_list};

/// What builders need from a parser
pub trait Parser {
    /// Current significant token. Lexical error tokens in the way are
    /// consumed and passed to [`Parser::recover`] first.
    fn current(&mut self) -> SyntaxResult<&Token>;

    /// Current token without lexical error filtering
    fn peek(&mut self) -> &Token;

    /// Consume the current token. `EndOfInput` is returned but not consumed.
    fn advance(&mut self) -> Token;

    fn last_consumed(&self) -> Option<Location>;

    fn consumed_count(&self) -> usize;

    /// Enter a named rule. Fails once the nesting limit is reached.
    fn enter(&mut self, context: &'static str) -> SyntaxResult<()>;

    fn exit(&mut self);

    /// Remember the active rule chain for an error that is unwinding
    fn mark_failure(&mut self);

    fn recovery_enabled(&self) -> bool;

    /// Record `error` and continue, or hand it back when parsing must stop
    fn recover(&mut self, error: SyntaxError) -> SyntaxResult<()>;

    /// Skip to the next statement boundary
    fn synchronize(&mut self);
}

// === HELPERS ===

pub fn current_kind(parser: &mut dyn Parser) -> SyntaxResult<TokenKind> {
    Ok(parser.current()?.kind)
}

pub fn check(parser: &mut dyn Parser, kind: TokenKind) -> SyntaxResult<bool> {
    Ok(current_kind(parser)? == kind)
}

/// Consume a token of `kind` or fail with an error naming `expected`
pub fn expect(parser: &mut dyn Parser, kind: TokenKind, expected: &str) -> SyntaxResult<Token> {
    if check(parser, kind)? {
        Ok(parser.advance())
    } else {
        Err(unexpected(parser, expected))
    }
}

/// Error for the current token. At end of input the error points at the
/// last consumed token.
pub fn unexpected(parser: &mut dyn Parser, expected: &str) -> SyntaxError {
    let last = parser.last_consumed();
    let token = parser.peek();
    if token.is_end() {
        SyntaxError::unexpected_end_of_input(expected, last.unwrap_or(token.location))
    } else {
        SyntaxError::unexpected_token(expected, &token.describe(), token.location)
    }
}

/// Zero-width location right after the last consumed token
pub fn insertion_point(parser: &dyn Parser) -> Location {
    parser
        .last_consumed()
        .map(Location::empty_after)
        .unwrap_or(Location::point(1, 1))
}

/// Consume a `;`. With recovery enabled a missing one is reported and
/// stands in at a zero-width location after the previous token.
pub fn expect_terminator(parser: &mut dyn Parser) -> SyntaxResult<Location> {
    if check(parser, TokenKind::Semicolon)? {
        return Ok(parser.advance().location);
    }

    let error = unexpected(parser, "';'");
    if !parser.recovery_enabled() {
        return Err(error);
    }
    parser.recover(error)?;
    Ok(insertion_point(parser))
}

/// Run `rule` inside a named context
pub fn nested<T, F>(parser: &mut dyn Parser, context: &'static str, rule: F) -> SyntaxResult<T>
where
    F: FnOnce(&mut dyn Parser) -> SyntaxResult<T>,
{
    parser.enter(context)?;
    let result = rule(parser);
    if result.is_err() {
        parser.mark_failure();
    }
    parser.exit();
    result
}

pub fn error_node(location: Location) -> Node {
    make_node(NodeKind::Error, location)
}
