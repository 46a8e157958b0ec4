//! Lexical error kinds carried by error tokens

use crate::logging::codes;
use serde::Serialize;

/// Malformed input found by the scanner. These never abort scanning; the
/// scanner wraps them in a [`TokenKind::Error`](crate::tokens::TokenKind)
/// token and the parser decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
pub enum LexicalError {
    #[error("invalid character '{character}'")]
    InvalidCharacter { character: char },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("unknown escape sequence '\\{escape}'")]
    InvalidEscape { escape: char },

    #[error("invalid numeric literal")]
    InvalidNumber,

    #[error("lexeme too long: {length} bytes (max {max})")]
    LexemeTooLong { length: usize, max: usize },

    #[error("string literal too large (max {max} bytes)")]
    StringTooLarge { max: usize },

    #[error("comment too long: {length} characters (max {max})")]
    CommentTooLong { length: usize, max: usize },

    #[error("block comments nested {depth} deep (max {max})")]
    CommentNestingTooDeep { depth: u32, max: u32 },

    #[error("too many tokens (max {max})")]
    TooManyTokens { max: usize },
}

impl LexicalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexicalError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexicalError::UnterminatedString => codes::lexical::UNTERMINATED_STRING,
            LexicalError::UnterminatedComment => codes::lexical::UNTERMINATED_COMMENT,
            LexicalError::InvalidEscape { .. } => codes::lexical::INVALID_ESCAPE,
            LexicalError::InvalidNumber => codes::lexical::INVALID_NUMBER,
            LexicalError::LexemeTooLong { .. } => codes::lexical::LEXEME_TOO_LONG,
            LexicalError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexicalError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexicalError::CommentNestingTooDeep { .. } => {
                codes::lexical::COMMENT_NESTING_TOO_DEEP
            }
            LexicalError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_codes() {
        let err = LexicalError::InvalidCharacter { character: '@' };
        assert_eq!(err.to_string(), "invalid character '@'");
        assert_eq!(err.error_code().as_str(), "E020");
        assert!(err.is_recoverable());

        let err = LexicalError::InvalidEscape { escape: 'q' };
        assert_eq!(err.to_string(), "unknown escape sequence '\\q'");

        assert!(!LexicalError::TooManyTokens { max: 10 }.is_recoverable());
    }
}
