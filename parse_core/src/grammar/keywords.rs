//! Reserved words of the reference grammar

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved words. `true` and `false` are boolean literals, not keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Let,
    Fn,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub const ALL: [Keyword; 6] = [
        Keyword::Let,
        Keyword::Fn,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::Return,
    ];

    /// Spelling in source text
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Let => "let",
            Self::Fn => "fn",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
        }
    }

    pub fn lookup(word: &str) -> Option<Self> {
        match word {
            "let" => Some(Self::Let),
            "fn" => Some(Self::Fn),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "while" => Some(Self::While),
            "return" => Some(Self::Return),
            _ => None,
        }
    }

    /// Keywords that can only begin a statement; recovery resynchronizes on these
    pub fn starts_statement(self) -> bool {
        !matches!(self, Self::Else)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_spelling() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::lookup(keyword.as_str()), Some(keyword));
        }
        assert_eq!(Keyword::lookup("Let"), None);
        assert_eq!(Keyword::lookup("true"), None);
    }

    #[test]
    fn else_does_not_start_statements() {
        assert!(!Keyword::Else.starts_statement());
        assert!(Keyword::While.starts_statement());
    }
}
