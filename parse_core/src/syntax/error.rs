//! Syntax errors, diagnostics and the top-level parse error
//!
//! Every syntax error carries the [`Location`] it refers to and maps to a
//! registered code, so diagnostics and log events share one vocabulary.

use crate::lexical::LexicalError;
use crate::logging::codes::{self, Severity};
use crate::logging::Code;
use crate::source::InputError;
use crate::utils::{Location, SourceMap};
use serde::Serialize;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String, location: Location },

    #[error("{error}")]
    Lexical {
        error: LexicalError,
        location: Location,
    },

    #[error("unclosed delimiter '{delimiter}'")]
    UnclosedDelimiter { delimiter: char, location: Location },

    #[error("unexpected closing delimiter '{delimiter}'")]
    UnexpectedClosingDelimiter { delimiter: char, location: Location },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget { location: Location },

    #[error("maximum nesting depth of {max} exceeded")]
    MaxRecursionDepth { max: usize, location: Location },

    #[error("too many errors ({count}), parsing stopped")]
    TooManyErrors { count: usize, location: Location },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, location: Location) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            location,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, location: Location) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            location,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::Lexical { error, .. } => error.error_code(),
            Self::UnclosedDelimiter { .. } => codes::syntax::UNCLOSED_DELIMITER,
            Self::UnexpectedClosingDelimiter { .. } => codes::syntax::UNEXPECTED_CLOSING_DELIMITER,
            Self::InvalidAssignmentTarget { .. } => codes::syntax::INVALID_ASSIGNMENT_TARGET,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::TooManyErrors { .. } => codes::syntax::TOO_MANY_ERRORS,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::UnexpectedToken { location, .. }
            | Self::UnexpectedEndOfInput { location, .. }
            | Self::Lexical { location, .. }
            | Self::UnclosedDelimiter { location, .. }
            | Self::UnexpectedClosingDelimiter { location, .. }
            | Self::InvalidAssignmentTarget { location }
            | Self::MaxRecursionDepth { location, .. }
            | Self::TooManyErrors { location, .. } => *location,
        }
    }

    /// Errors that stop parsing even when recovery is enabled
    pub fn requires_halt(&self) -> bool {
        match self {
            Self::Lexical { error, .. } => !error.is_recoverable(),
            _ => codes::requires_halt(self.error_code().as_str()),
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }
}

/// A reported problem with its location, ready for display or JSON export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: Code,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Rule chain active when the error was found, e.g. `program > block`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn from_error(error: &SyntaxError, context: Option<String>) -> Self {
        Self {
            code: error.error_code(),
            severity: error.severity(),
            message: error.to_string(),
            location: error.location(),
            context,
        }
    }

    pub fn from_input_error(error: &InputError) -> Self {
        let code = error.error_code();
        Self {
            code,
            severity: codes::get_severity(code.as_str()),
            message: error.to_string(),
            location: error.location().unwrap_or(Location::point(1, 1)),
            context: None,
        }
    }

    /// Message with a caret line under the offending source text
    pub fn render(&self, source: &SourceMap) -> String {
        let mut rendered =
            source.format_error(&self.location, &format!("[{}] {}", self.code, self.message));
        if let Some(context) = &self.context {
            rendered.push_str(&format!("  = note: while parsing {}\n", context));
        }
        rendered
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.location, self.message)
    }
}

/// Failure of a whole parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("syntax error: {}", summarize(.diagnostics))]
    Syntax { diagnostics: Vec<Diagnostic> },
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics.last() {
        Some(last) if diagnostics.len() == 1 => last.to_string(),
        Some(last) => format!("{} ({} diagnostics)", last, diagnostics.len()),
        None => "no diagnostics".to_string(),
    }
}

impl ParseError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidInput(error) => error.error_code(),
            Self::Syntax { diagnostics } => diagnostics
                .last()
                .map(|diagnostic| diagnostic.code)
                .unwrap_or(codes::syntax::UNEXPECTED_TOKEN),
        }
    }

    /// Every diagnostic, including a single one for invalid input
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::InvalidInput(error) => vec![Diagnostic::from_input_error(error)],
            Self::Syntax { diagnostics } => diagnostics.clone(),
        }
    }

    /// Location of the error that ended the parse
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::InvalidInput(error) => error.location(),
            Self::Syntax { diagnostics } => diagnostics.last().map(|d| d.location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::point;

    #[test]
    fn codes_and_locations() {
        let error = SyntaxError::unexpected_token("';'", "identifier 'y'", point(2, 5));
        assert_eq!(error.error_code().as_str(), "E050");
        assert_eq!(error.location(), point(2, 5));
        assert_eq!(error.to_string(), "expected ';', found identifier 'y'");
        assert!(!error.requires_halt());

        let error = SyntaxError::MaxRecursionDepth {
            max: 128,
            location: point(1, 1),
        };
        assert_eq!(error.error_code().as_str(), "E087");
        assert!(error.requires_halt());
    }

    #[test]
    fn lexical_errors_keep_their_codes() {
        let error = SyntaxError::Lexical {
            error: LexicalError::UnterminatedString,
            location: point(1, 1),
        };
        assert_eq!(error.error_code().as_str(), "E021");
        assert!(!error.requires_halt());

        let error = SyntaxError::Lexical {
            error: LexicalError::TooManyTokens { max: 4 },
            location: point(1, 1),
        };
        assert!(error.requires_halt());
    }

    #[test]
    fn diagnostic_renders_with_caret() {
        let source = SourceMap::new("let = 1;");
        let error = SyntaxError::unexpected_token("identifier", "'='", Location::new(
            crate::utils::Position::new(1, 5),
            crate::utils::Position::new(1, 6),
        ));
        let diagnostic = Diagnostic::from_error(&error, Some("program > let".to_string()));

        let rendered = diagnostic.render(&source);
        assert!(rendered.contains("[E050] expected identifier, found '='"));
        assert!(rendered.contains("1:5"));
        assert!(rendered.contains("let = 1;"));
        assert!(rendered.contains("while parsing program > let"));
    }

    #[test]
    fn parse_error_reports_last_diagnostic() {
        let error = SyntaxError::unexpected_end_of_input("'}'", point(3, 1));
        let parse_error = ParseError::Syntax {
            diagnostics: vec![Diagnostic::from_error(&error, None)],
        };
        assert_eq!(parse_error.error_code().as_str(), "E040");
        assert_eq!(parse_error.location(), Some(point(3, 1)));
        assert!(parse_error.to_string().starts_with("syntax error: E040 at 3:1"));
    }
}
