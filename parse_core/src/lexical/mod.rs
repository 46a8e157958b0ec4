//! Lexical analysis
//!
//! The scanner is a handle, not a process-wide singleton: [`open`] creates
//! one over a buffer, [`next_token`] pulls tokens from it and [`close`]
//! releases it. Independent handles never observe each other.

pub mod error;
pub mod scanner;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::{InputPreferences, LexicalPreferences};
use crate::source::InputError;
use crate::tokens::Token;

pub use error::LexicalError;
pub use scanner::{LexicalMetrics, ScanMode, Scanner};

/// Create a scanner over `buffer` with default preferences
pub fn open(buffer: &[u8]) -> Result<Scanner<'_>, InputError> {
    Scanner::open(buffer)
}

/// Create a scanner with explicit input and lexical preferences
pub fn open_with_preferences<'src>(
    buffer: &'src [u8],
    input: &InputPreferences,
    preferences: LexicalPreferences,
) -> Result<Scanner<'src>, InputError> {
    Scanner::open_with(buffer, input, preferences)
}

pub fn next_token(scanner: &mut Scanner<'_>) -> Token {
    scanner.next_token()
}

pub fn close(scanner: Scanner<'_>) -> LexicalMetrics {
    scanner.close()
}

/// Scan a whole buffer, `EndOfInput` excluded
pub fn tokenize(buffer: &[u8]) -> Result<(Vec<Token>, LexicalMetrics), InputError> {
    let mut scanner = open(buffer)?;
    let tokens: Vec<Token> = scanner.by_ref().collect();
    Ok((tokens, scanner.close()))
}

/// Check that every lexical code has registry metadata and log the limits
/// in effect
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::UNTERMINATED_COMMENT,
        crate::logging::codes::lexical::INVALID_ESCAPE,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::LEXEME_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::COMMENT_TOO_LONG,
        crate::logging::codes::lexical::COMMENT_NESTING_TOO_DEEP,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_lexeme_length" => MAX_LEXEME_LENGTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_comment_nesting" => MAX_COMMENT_NESTING,
        "max_token_count" => MAX_TOKEN_COUNT,
        "tab_width" => TAB_WIDTH
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::Location;
    use assert_matches::assert_matches;

    #[test]
    fn open_next_close_cycle() {
        let mut scanner = open(b"x;").unwrap();
        assert_eq!(next_token(&mut scanner).kind, TokenKind::Identifier);
        assert_eq!(next_token(&mut scanner).kind, TokenKind::Semicolon);
        let end = next_token(&mut scanner);
        assert!(end.is_end());
        assert_eq!(end.location, Location::point(1, 3));
        assert_eq!(close(scanner).total_tokens, 2);
    }

    #[test]
    fn tokenize_excludes_end_of_input() {
        let (tokens, metrics) = tokenize(b"a + b").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(metrics.total_tokens, 3);
    }

    #[test]
    fn open_rejects_invalid_utf8() {
        assert_matches!(
            open(&[0x61, 0xff, 0x62]).err(),
            Some(InputError::InvalidEncoding { offset: 1, .. })
        );
    }

    #[test]
    fn byte_order_mark_is_not_a_token() {
        let (tokens, _) = tokenize(b"\xef\xbb\xbfx").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].location, Location::point(1, 1).merge(Location::point(1, 2)));
    }

    #[test]
    fn kept_byte_order_mark_is_an_invalid_character() {
        let input = InputPreferences {
            strip_byte_order_mark: false,
        };
        let mut scanner =
            open_with_preferences("\u{feff}x".as_bytes(), &input, LexicalPreferences::default())
                .unwrap();

        let mark = next_token(&mut scanner);
        assert_matches!(
            mark.kind,
            TokenKind::Error(LexicalError::InvalidCharacter { character: '\u{feff}' })
        );
        assert_eq!(mark.location, Location::point(1, 1).merge(Location::point(1, 2)));

        let name = next_token(&mut scanner);
        assert_eq!(name.kind, TokenKind::Identifier);
        assert_eq!(name.location.start.column, 2);
        close(scanner);
    }

    #[test]
    fn lexical_codes_are_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }
}
