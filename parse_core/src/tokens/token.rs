//! Tokens produced by the scanner

use crate::grammar::keywords::Keyword;
use crate::lexical::LexicalError;
use crate::utils::Location;
use serde::Serialize;
use std::fmt;

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Keyword(Keyword),
    Integer,
    Float,
    Str,
    Boolean,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    /// Only produced when comments are retained
    Comment,
    /// Malformed input; the lexeme holds the offending text
    Error(LexicalError),
    EndOfInput,
}

impl TokenKind {
    /// Short description for "expected X, found Y" messages
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier => "identifier".to_string(),
            Self::Keyword(keyword) => format!("'{}'", keyword),
            Self::Integer => "integer literal".to_string(),
            Self::Float => "float literal".to_string(),
            Self::Str => "string literal".to_string(),
            Self::Boolean => "boolean literal".to_string(),
            Self::Comment => "comment".to_string(),
            Self::Error(_) => "invalid token".to_string(),
            Self::EndOfInput => "end of input".to_string(),
            punctuation => format!("'{}'", punctuation.symbol().unwrap_or("?")),
        }
    }

    /// Source spelling of operator and punctuation kinds
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::Assign => "=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Str | Self::Boolean)
    }

    pub fn is_operator(&self) -> bool {
        self.symbol().is_some()
    }

    /// Tokens the grammar consumes; comments are trivia
    pub fn is_significant(&self) -> bool {
        !matches!(self, Self::Comment)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Self::Keyword(keyword) => Some(*keyword),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Semantic value computed by the scanner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenValue {
    None,
    Integer(i64),
    Float(f64),
    /// String contents with escapes decoded
    Str(String),
    Boolean(bool),
}

/// A scanned token. `lexeme` is the raw source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub value: TokenValue,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, value: TokenValue, location: Location) -> Self {
        Self {
            kind,
            lexeme,
            value,
            location,
        }
    }

    pub fn end_of_input(location: Location) -> Self {
        Self::new(TokenKind::EndOfInput, String::new(), TokenValue::None, location)
    }

    pub fn is_end(&self) -> bool {
        self.kind.is_end()
    }

    /// Description used as the "found" half of syntax errors
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier '{}'", self.lexeme),
            TokenKind::Integer | TokenKind::Float | TokenKind::Str | TokenKind::Boolean => {
                format!("{} {}", self.kind.describe(), self.lexeme)
            }
            _ => self.kind.describe(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.describe(), self.location)
    }
}
