//! Syntax analysis: bytes in, one located AST out
//!
//! The entry points here open a scanner over the caller's buffer, hand it to
//! a [`ParserDriver`] and return either a [`ParseOutput`] or a
//! [`ParseError`]. Every parse owns its scanner, so concurrent parses on
//! different threads share nothing but the logging sink.

pub mod error;
pub mod parser;

pub use error::{Diagnostic, ParseError, SyntaxError, SyntaxResult};
pub use parser::{ParseOutput, ParserDriver};

use crate::config::runtime::{RuntimeConfig, SyntaxPreferences};
use crate::lexical;
use crate::logging::{self, codes};
use crate::source::SourceBuffer;
use crate::{log_debug, log_success};

/// Parse `buffer` with preferences taken from the environment
pub fn parse_bytes(buffer: &[u8]) -> Result<ParseOutput, ParseError> {
    parse_with_config(buffer, &RuntimeConfig::default())
}

pub fn parse_str(text: &str) -> Result<ParseOutput, ParseError> {
    parse_bytes(text.as_bytes())
}

/// Parse with explicit syntax preferences, everything else defaulted
pub fn parse_with_preferences(
    buffer: &[u8],
    preferences: &SyntaxPreferences,
) -> Result<ParseOutput, ParseError> {
    let config = RuntimeConfig {
        syntax: preferences.clone(),
        ..RuntimeConfig::default()
    };
    parse_with_config(buffer, &config)
}

pub fn parse_with_config(buffer: &[u8], config: &RuntimeConfig) -> Result<ParseOutput, ParseError> {
    let scanner = lexical::open_with_preferences(buffer, &config.input, config.lexical.clone())?;

    log_success!(
        codes::success::INPUT_ACCEPTED,
        "Input accepted",
        "bytes" => buffer.len()
    );

    ParserDriver::new(scanner, config.syntax.clone()).parse()
}

/// Parse a named buffer. Log events carry the buffer name as their source.
pub fn parse_buffer(buffer: &SourceBuffer, config: &RuntimeConfig) -> Result<ParseOutput, ParseError> {
    logging::with_source_context(buffer.name(), || {
        log_debug!("Parsing buffer", "name" => buffer.name(), "bytes" => buffer.len());
        parse_with_config(buffer.as_bytes(), config)
    })
}

/// Check that every syntax code has registry metadata
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::UNCLOSED_DELIMITER,
        codes::syntax::UNEXPECTED_CLOSING_DELIMITER,
        codes::syntax::INVALID_ASSIGNMENT_TARGET,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::TOO_MANY_ERRORS,
        codes::syntax::MAX_RECURSION_DEPTH,
    ];

    for code in &syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}
