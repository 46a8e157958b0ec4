//! Lookahead buffer between the scanner and the parser
//!
//! Tokens are pulled from the scanner on demand. Comment tokens never reach
//! the parser; they are set aside as trivia so callers can still get them
//! back after parsing.

use crate::config::compile_time::syntax::MAX_LOOKAHEAD_TOKENS;
use crate::lexical::{LexicalMetrics, Scanner};
use crate::tokens::token::{Token, TokenKind};
use crate::utils::{Location, Position};
use std::collections::VecDeque;

pub struct TokenStream<'src> {
    scanner: Scanner<'src>,
    /// Significant tokens read but not yet consumed
    lookahead: VecDeque<Token>,
    /// Comments, in source order
    trivia: Vec<Token>,
    last_consumed: Option<Location>,
    consumed: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(scanner: Scanner<'src>) -> Self {
        Self {
            scanner,
            lookahead: VecDeque::with_capacity(MAX_LOOKAHEAD_TOKENS),
            trivia: Vec::new(),
            last_consumed: None,
            consumed: 0,
        }
    }

    fn fill(&mut self, count: usize) {
        while self.lookahead.len() < count {
            let token = self.scanner.next_token();
            if token.kind == TokenKind::Comment {
                self.trivia.push(token);
            } else {
                self.lookahead.push_back(token);
            }
        }
    }

    /// The next unconsumed token
    pub fn current(&mut self) -> &Token {
        self.fill(1);
        &self.lookahead[0]
    }

    /// Token `n` places after the current one. `n` is capped by the
    /// configured lookahead window.
    pub fn peek_ahead(&mut self, n: usize) -> &Token {
        let n = n.min(MAX_LOOKAHEAD_TOKENS.saturating_sub(1));
        self.fill(n + 1);
        &self.lookahead[n]
    }

    /// Consume and return the current token. `EndOfInput` is never
    /// consumed; advancing at the end returns it again.
    pub fn advance(&mut self) -> Token {
        self.fill(1);
        if self.lookahead[0].is_end() {
            return self.lookahead[0].clone();
        }
        match self.lookahead.pop_front() {
            Some(token) => {
                self.last_consumed = Some(token.location);
                self.consumed += 1;
                token
            }
            None => Token::end_of_input(Location::at(self.scanner.position())),
        }
    }

    pub fn check(&mut self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub fn is_at_end(&mut self) -> bool {
        self.current().is_end()
    }

    /// Location of the most recently consumed token
    pub fn last_consumed(&self) -> Option<Location> {
        self.last_consumed
    }

    /// End of the most recently consumed token, or the start of input
    pub fn previous_end(&self) -> Position {
        self.last_consumed
            .map(|location| location.end)
            .unwrap_or_else(Position::start)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed
    }

    /// Close the underlying scanner. Returns its metrics and the comments
    /// that were skipped.
    pub fn finish(self) -> (LexicalMetrics, Vec<Token>) {
        let Self {
            scanner, trivia, ..
        } = self;
        (scanner.close(), trivia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;

    fn stream(text: &str, retain_comments: bool) -> TokenStream<'_> {
        let preferences = LexicalPreferences {
            retain_comments,
            collect_detailed_metrics: true,
            trace_tokens: false,
        };
        TokenStream::new(Scanner::open_str(text, preferences).unwrap())
    }

    #[test]
    fn advance_tracks_consumed_tokens() {
        let mut tokens = stream("a = b;", false);
        assert_eq!(tokens.previous_end(), Position::start());

        assert_eq!(tokens.advance().lexeme, "a");
        assert_eq!(tokens.advance().kind, TokenKind::Assign);
        assert_eq!(tokens.consumed_count(), 2);
        assert_eq!(tokens.previous_end(), Position::new(1, 4));
        assert!(tokens.check(TokenKind::Identifier));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut tokens = stream("f ( x )", false);
        assert_eq!(tokens.peek_ahead(1).kind, TokenKind::LeftParen);
        assert_eq!(tokens.peek_ahead(3).kind, TokenKind::RightParen);
        assert_eq!(tokens.peek_ahead(6).kind, TokenKind::EndOfInput);
        assert_eq!(tokens.current().lexeme, "f");
        assert_eq!(tokens.consumed_count(), 0);
    }

    #[test]
    fn end_of_input_is_never_consumed() {
        let mut tokens = stream("x", false);
        tokens.advance();
        let first = tokens.advance();
        let second = tokens.advance();
        assert!(first.is_end());
        assert_eq!(first, second);
        assert_eq!(tokens.consumed_count(), 1);
        assert!(tokens.is_at_end());
    }

    #[test]
    fn comments_become_trivia() {
        let mut tokens = stream("// head\nx /* mid */ y", true);
        assert_eq!(tokens.advance().lexeme, "x");
        assert_eq!(tokens.advance().lexeme, "y");
        assert!(tokens.is_at_end());

        let (metrics, trivia) = tokens.finish();
        assert_eq!(trivia.len(), 2);
        assert_eq!(trivia[0].lexeme, "// head");
        assert_eq!(trivia[1].lexeme, "/* mid */");
        assert_eq!(metrics.comment_count, 2);
    }
}
