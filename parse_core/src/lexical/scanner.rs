//! Reentrant scanner handle
//!
//! A [`Scanner`] owns every piece of mutable lexical state for one input
//! buffer: cursor, current position, start condition, pending error, token
//! counter and metrics. Nothing is global or thread-local, so any number of
//! scanners can run at once on different threads. The scanner borrows its
//! buffer, so it cannot outlive it.

use crate::config::compile_time::lexical::{
    MAX_COMMENT_LENGTH, MAX_COMMENT_NESTING, MAX_LEXEME_LENGTH, MAX_STRING_SIZE, MAX_TOKEN_COUNT,
    TAB_WIDTH,
};
use crate::config::runtime::{InputPreferences, LexicalPreferences};
use crate::grammar::keywords::Keyword;
use crate::lexical::LexicalError;
use crate::logging::codes;
use crate::source::{decode, InputError};
use crate::tokens::{Token, TokenKind, TokenValue};
use crate::utils::{Location, Position};
use crate::{log_debug, log_success};
use serde::Serialize;
use std::iter::FusedIterator;

/// Start condition of the scanner. Persists across `next_token` calls only
/// while a construct is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Initial,
    LineComment,
    BlockComment { depth: u32 },
    StringLiteral,
}

/// Counters collected while scanning; returned by [`Scanner::close`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub keyword_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub comment_count: usize,
    pub error_tokens: usize,
    pub longest_lexeme: usize,
    pub deepest_comment_nesting: u32,
    pub lines_scanned: u32,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.longest_lexeme = self.longest_lexeme.max(token.lexeme.len());

        if let TokenKind::Error(_) = token.kind {
            self.error_tokens += 1;
            return;
        }

        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.kind {
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::Keyword(_) => self.keyword_tokens += 1,
            TokenKind::Comment => self.comment_count += 1,
            kind if kind.is_literal() => self.literal_tokens += 1,
            kind if kind.is_operator() => self.operator_tokens += 1,
            _ => {}
        }
    }

    fn record_comment_nesting(&mut self, depth: u32) {
        self.deepest_comment_nesting = self.deepest_comment_nesting.max(depth);
    }
}

/// Scanner handle bound to one input buffer
pub struct Scanner<'src> {
    source: &'src str,
    cursor: usize,
    position: Position,
    mode: ScanMode,
    lexeme_start: usize,
    token_start: Position,
    /// Decoded contents of the string literal being scanned
    string_value: String,
    /// First error found inside the construct being scanned
    pending_error: Option<LexicalError>,
    comment_length: usize,
    token_count: usize,
    /// Location of end of input, once reached
    finished: Option<Location>,
    closed: bool,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl<'src> Scanner<'src> {
    /// Open a scanner over raw bytes with preferences from the environment.
    ///
    /// Fails with [`InputError`] before any token is produced when the
    /// buffer is too large or not valid UTF-8.
    pub fn open(buffer: &'src [u8]) -> Result<Self, InputError> {
        Self::open_with(
            buffer,
            &InputPreferences::default(),
            LexicalPreferences::default(),
        )
    }

    pub fn open_with(
        buffer: &'src [u8],
        input: &InputPreferences,
        preferences: LexicalPreferences,
    ) -> Result<Self, InputError> {
        let source = decode(buffer, input)?;

        log_debug!("Scanner opened", "bytes" => source.len());

        Ok(Self {
            source,
            cursor: 0,
            position: Position::start(),
            mode: ScanMode::Initial,
            lexeme_start: 0,
            token_start: Position::start(),
            string_value: String::new(),
            pending_error: None,
            comment_length: 0,
            token_count: 0,
            finished: None,
            closed: false,
            metrics: LexicalMetrics::default(),
            preferences,
        })
    }

    /// Open over text that is already known to be UTF-8
    pub fn open_str(text: &'src str, preferences: LexicalPreferences) -> Result<Self, InputError> {
        Self::open_with(text.as_bytes(), &InputPreferences::default(), preferences)
    }

    /// Next token with its location. Once `EndOfInput` has been returned,
    /// every later call returns `EndOfInput` at the same location.
    pub fn next_token(&mut self) -> Token {
        if let Some(end) = self.finished {
            return Token::end_of_input(end);
        }

        let token = self.scan();
        if !token.is_end() {
            self.token_count += 1;
            self.metrics.record_token(&token, &self.preferences);
            if self.preferences.trace_tokens {
                log_debug!("Token", "kind" => token.kind, "location" => token.location);
            }
        }
        token
    }

    /// Release the handle and return what it measured. Dropping a scanner
    /// without calling this is also safe.
    pub fn close(mut self) -> LexicalMetrics {
        self.closed = true;
        self.metrics.lines_scanned = self.position.line;
        std::mem::take(&mut self.metrics)
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Position of the next unread character
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    // ------------------------------------------------------------------
    // Start-condition machine
    // ------------------------------------------------------------------

    fn scan(&mut self) -> Token {
        loop {
            match self.mode {
                ScanMode::Initial => {
                    self.begin_lexeme();
                    let Some(ch) = self.peek() else {
                        return self.finish();
                    };

                    if ch.is_whitespace() {
                        self.bump();
                        continue;
                    }

                    if self.token_count >= MAX_TOKEN_COUNT {
                        return self.token_limit_reached();
                    }

                    match ch {
                        '/' if self.peek_next() == Some('/') => {
                            self.bump();
                            self.bump();
                            self.comment_length = 2;
                            self.mode = ScanMode::LineComment;
                        }
                        '/' if self.peek_next() == Some('*') => {
                            self.bump();
                            self.bump();
                            self.comment_length = 2;
                            self.metrics.record_comment_nesting(1);
                            self.mode = ScanMode::BlockComment { depth: 1 };
                        }
                        '"' => {
                            self.bump();
                            self.string_value.clear();
                            self.mode = ScanMode::StringLiteral;
                        }
                        c if c.is_ascii_digit() => return self.scan_number(),
                        c if c.is_ascii_alphabetic() || c == '_' => return self.scan_word(),
                        _ => return self.scan_operator(),
                    }
                }

                ScanMode::LineComment => match self.peek() {
                    None | Some('\n') | Some('\r') => {
                        self.mode = ScanMode::Initial;
                        if let Some(token) = self.finish_comment() {
                            return token;
                        }
                    }
                    Some(_) => {
                        self.bump();
                        self.comment_length += 1;
                    }
                },

                ScanMode::BlockComment { depth } => match (self.peek(), self.peek_next()) {
                    (None, _) => {
                        self.mode = ScanMode::Initial;
                        return self.error_token(LexicalError::UnterminatedComment);
                    }
                    (Some('*'), Some('/')) => {
                        self.bump();
                        self.bump();
                        self.comment_length += 2;
                        if depth == 1 {
                            self.mode = ScanMode::Initial;
                            if let Some(token) = self.finish_comment() {
                                return token;
                            }
                        } else {
                            self.mode = ScanMode::BlockComment { depth: depth - 1 };
                        }
                    }
                    (Some('/'), Some('*')) => {
                        self.bump();
                        self.bump();
                        self.comment_length += 2;
                        let depth = depth + 1;
                        self.metrics.record_comment_nesting(depth);
                        if depth > MAX_COMMENT_NESTING {
                            self.set_pending(LexicalError::CommentNestingTooDeep {
                                depth,
                                max: MAX_COMMENT_NESTING,
                            });
                        }
                        self.mode = ScanMode::BlockComment { depth };
                    }
                    (Some(_), _) => {
                        self.bump();
                        self.comment_length += 1;
                    }
                },

                ScanMode::StringLiteral => match self.peek() {
                    None | Some('\n') | Some('\r') => {
                        self.mode = ScanMode::Initial;
                        return self.error_token(LexicalError::UnterminatedString);
                    }
                    Some('"') => {
                        self.bump();
                        self.mode = ScanMode::Initial;
                        return self.finish_string();
                    }
                    Some('\\') => {
                        self.bump();
                        // A line break or end of input after the backslash is
                        // reported as an unterminated string on the next pass
                        if let Some(escape) = self.peek().filter(|c| *c != '\n' && *c != '\r') {
                            self.bump();
                            match decode_escape(escape) {
                                Some(decoded) => self.push_string_char(decoded),
                                None => self.set_pending(LexicalError::InvalidEscape { escape }),
                            }
                        }
                    }
                    Some(c) => {
                        self.bump();
                        self.push_string_char(c);
                    }
                },
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        self.bump_while(|c| c.is_ascii_digit());

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        // `12abc` is one malformed number, not a number and an identifier
        if self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
            return self.error_token(LexicalError::InvalidNumber);
        }

        let length = self.cursor - self.lexeme_start;
        if length > MAX_LEXEME_LENGTH {
            return self.error_token(LexicalError::LexemeTooLong {
                length,
                max: MAX_LEXEME_LENGTH,
            });
        }

        let text = &self.source[self.lexeme_start..self.cursor];
        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    self.make_token(TokenKind::Float, TokenValue::Float(value))
                }
                _ => self.error_token(LexicalError::InvalidNumber),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => self.make_token(TokenKind::Integer, TokenValue::Integer(value)),
                Err(_) => self.error_token(LexicalError::InvalidNumber),
            }
        }
    }

    fn scan_word(&mut self) -> Token {
        self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let length = self.cursor - self.lexeme_start;
        if length > MAX_LEXEME_LENGTH {
            return self.error_token(LexicalError::LexemeTooLong {
                length,
                max: MAX_LEXEME_LENGTH,
            });
        }

        let word = &self.source[self.lexeme_start..self.cursor];
        match word {
            "true" => self.make_token(TokenKind::Boolean, TokenValue::Boolean(true)),
            "false" => self.make_token(TokenKind::Boolean, TokenValue::Boolean(false)),
            _ => match Keyword::lookup(word) {
                Some(keyword) => self.make_token(TokenKind::Keyword(keyword), TokenValue::None),
                None => self.make_token(TokenKind::Identifier, TokenValue::None),
            },
        }
    }

    fn scan_operator(&mut self) -> Token {
        let Some(ch) = self.bump() else {
            return self.finish();
        };
        let next = self.peek();

        let (kind, pair) = match (ch, next) {
            ('=', Some('=')) => (TokenKind::EqualEqual, true),
            ('!', Some('=')) => (TokenKind::BangEqual, true),
            ('<', Some('=')) => (TokenKind::LessEqual, true),
            ('>', Some('=')) => (TokenKind::GreaterEqual, true),
            ('&', Some('&')) => (TokenKind::AndAnd, true),
            ('|', Some('|')) => (TokenKind::OrOr, true),
            ('=', _) => (TokenKind::Assign, false),
            ('!', _) => (TokenKind::Bang, false),
            ('<', _) => (TokenKind::Less, false),
            ('>', _) => (TokenKind::Greater, false),
            ('+', _) => (TokenKind::Plus, false),
            ('-', _) => (TokenKind::Minus, false),
            ('*', _) => (TokenKind::Star, false),
            ('/', _) => (TokenKind::Slash, false),
            ('%', _) => (TokenKind::Percent, false),
            ('(', _) => (TokenKind::LeftParen, false),
            (')', _) => (TokenKind::RightParen, false),
            ('{', _) => (TokenKind::LeftBrace, false),
            ('}', _) => (TokenKind::RightBrace, false),
            (',', _) => (TokenKind::Comma, false),
            (';', _) => (TokenKind::Semicolon, false),
            (character, _) => {
                return self.error_token(LexicalError::InvalidCharacter { character });
            }
        };

        if pair {
            self.bump();
        }
        self.make_token(kind, TokenValue::None)
    }

    fn finish_comment(&mut self) -> Option<Token> {
        if self.comment_length > MAX_COMMENT_LENGTH {
            self.set_pending(LexicalError::CommentTooLong {
                length: self.comment_length,
                max: MAX_COMMENT_LENGTH,
            });
        }
        if let Some(error) = self.pending_error {
            return Some(self.error_token(error));
        }
        if self.preferences.retain_comments {
            return Some(self.make_token(TokenKind::Comment, TokenValue::None));
        }
        None
    }

    fn finish_string(&mut self) -> Token {
        if let Some(error) = self.pending_error {
            return self.error_token(error);
        }
        let value = std::mem::take(&mut self.string_value);
        self.make_token(TokenKind::Str, TokenValue::Str(value))
    }

    fn finish(&mut self) -> Token {
        let end = Location::at(self.position);
        self.finished = Some(end);

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Tokenization complete",
            "tokens" => self.token_count,
            "errors" => self.metrics.error_tokens,
            "lines" => self.position.line
        );

        Token::end_of_input(end)
    }

    fn token_limit_reached(&mut self) -> Token {
        let at = Location::at(self.position);
        self.finished = Some(at);
        Token::new(
            TokenKind::Error(LexicalError::TooManyTokens {
                max: MAX_TOKEN_COUNT,
            }),
            String::new(),
            TokenValue::None,
            at,
        )
    }

    // ------------------------------------------------------------------
    // Character and lexeme helpers
    // ------------------------------------------------------------------

    fn begin_lexeme(&mut self) {
        self.lexeme_start = self.cursor;
        self.token_start = self.position;
        self.pending_error = None;
        self.comment_length = 0;
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.cursor..].chars();
        chars.next();
        chars.next()
    }

    /// Consume one character. `\r\n` is consumed as a single line break.
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor += ch.len_utf8();
        self.position = match ch {
            '\r' => {
                if self.peek() == Some('\n') {
                    self.cursor += 1;
                }
                self.position.newline()
            }
            other => self.position.advance(other, TAB_WIDTH),
        };
        Some(ch)
    }

    fn bump_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn push_string_char(&mut self, ch: char) {
        if self.string_value.len() + ch.len_utf8() > MAX_STRING_SIZE {
            self.set_pending(LexicalError::StringTooLarge {
                max: MAX_STRING_SIZE,
            });
        } else {
            self.string_value.push(ch);
        }
    }

    /// Keep the first error of the current construct
    fn set_pending(&mut self, error: LexicalError) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn current_location(&self) -> Location {
        Location::new(self.token_start, self.position)
    }

    fn make_token(&mut self, kind: TokenKind, value: TokenValue) -> Token {
        let lexeme = self.source[self.lexeme_start..self.cursor].to_string();
        Token::new(kind, lexeme, value, self.current_location())
    }

    fn error_token(&mut self, error: LexicalError) -> Token {
        self.pending_error = None;
        self.string_value.clear();
        log_debug!("Lexical error", "error" => error, "location" => self.current_location());
        self.make_token(TokenKind::Error(error), TokenValue::None)
    }
}

impl Drop for Scanner<'_> {
    fn drop(&mut self) {
        if !self.closed {
            log_debug!("Scanner released without close", "tokens" => self.token_count);
        }
    }
}

/// Yields tokens up to, but not including, `EndOfInput`
impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is_end()).then_some(token)
    }
}

impl FusedIterator for Scanner<'_> {}

fn decode_escape(escape: char) -> Option<char> {
    match escape {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '0' => Some('\0'),
        _ => None,
    }
}
