//! Error and success codes with their classification metadata
//!
//! Every error type in the crate maps onto one of these codes through its
//! `error_code()` method, so log output, diagnostics and recovery decisions
//! all read from the same table.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Input acquisition error codes
pub mod input {
    use super::Code;

    pub const SOURCE_NOT_FOUND: Code = Code::new("E005");
    pub const BUFFER_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Lexical error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const LEXEME_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INVALID_ESCAPE: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const COMMENT_NESTING_TOO_DEEP: Code = Code::new("E028");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E029");
}

/// Syntax error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E040");
    pub const UNCLOSED_DELIMITER: Code = Code::new("E041");
    pub const UNEXPECTED_CLOSING_DELIMITER: Code = Code::new("E042");
    pub const INVALID_ASSIGNMENT_TARGET: Code = Code::new("E043");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const TOO_MANY_ERRORS: Code = Code::new("E086");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// AST integrity error codes
pub mod ast {
    use super::Code;

    pub const ENCLOSURE_VIOLATION: Code = Code::new("E060");
    pub const SERIALIZATION_FAILURE: Code = Code::new("E061");
}

/// Batch parsing error codes
pub mod batch {
    use super::Code;

    pub const TOO_MANY_BUFFERS: Code = Code::new("E070");
    pub const WORKER_FAILURE: Code = Code::new("E071");
}

/// Success and progress codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const INPUT_ACCEPTED: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const RECOVERED_WITH_DIAGNOSTICS: Code = Code::new("I041");
    pub const BATCH_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal error",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "System initialization failure",
        "Check logging configuration and environment",
    ),
    ErrorMetadata::new(
        "ERR003",
        "System",
        Severity::High,
        false,
        true,
        "Invalid configuration",
        "Fix the preferences file or environment variables",
    ),
    // Input
    ErrorMetadata::new(
        "E005",
        "Input",
        Severity::Medium,
        false,
        true,
        "Source file not found",
        "Verify the source path exists",
    ),
    ErrorMetadata::new(
        "E007",
        "Input",
        Severity::High,
        false,
        true,
        "Source buffer exceeds the configured size limit",
        "Split the input or raise input.max_buffer_size",
    ),
    ErrorMetadata::new(
        "E009",
        "Input",
        Severity::High,
        false,
        true,
        "Permission denied reading source",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "Input",
        Severity::High,
        false,
        true,
        "Source is not valid UTF-8",
        "Re-encode the source as UTF-8",
    ),
    ErrorMetadata::new(
        "E011",
        "Input",
        Severity::High,
        false,
        true,
        "I/O error while reading source",
        "Check storage and retry",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Character not valid in this position",
        "Remove or escape the character",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "String literal is not terminated before end of line",
        "Add the closing quote",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Malformed or out-of-range numeric literal",
        "Use a decimal literal within i64/f64 range",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Identifier or number exceeds the maximum lexeme length",
        "Shorten the lexeme",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "String literal exceeds the maximum size",
        "Shorten the string literal",
    ),
    ErrorMetadata::new(
        "E025",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Unknown escape sequence in string literal",
        "Use one of \\n \\t \\r \\\\ \\\" \\0",
    ),
    ErrorMetadata::new(
        "E026",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Comment exceeds the maximum length",
        "Shorten the comment",
    ),
    ErrorMetadata::new(
        "E027",
        "Lexical",
        Severity::High,
        false,
        false,
        "Token count limit reached",
        "Split the input or raise lexical.max_token_count",
    ),
    ErrorMetadata::new(
        "E028",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Block comments nested too deeply",
        "Reduce comment nesting",
    ),
    ErrorMetadata::new(
        "E029",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Block comment is not terminated",
        "Add the closing */",
    ),
    // Syntax
    ErrorMetadata::new(
        "E040",
        "Syntax",
        Severity::High,
        true,
        false,
        "Input ended inside a construct",
        "Complete the construct",
    ),
    ErrorMetadata::new(
        "E041",
        "Syntax",
        Severity::High,
        true,
        false,
        "Opening delimiter is never closed",
        "Add the matching closing delimiter",
    ),
    ErrorMetadata::new(
        "E042",
        "Syntax",
        Severity::Medium,
        true,
        false,
        "Closing delimiter without a matching opener",
        "Remove the delimiter or add its opener",
    ),
    ErrorMetadata::new(
        "E043",
        "Syntax",
        Severity::Medium,
        true,
        false,
        "Left side of assignment is not an identifier",
        "Assign to a variable name",
    ),
    ErrorMetadata::new(
        "E050",
        "Syntax",
        Severity::High,
        true,
        false,
        "Unexpected token",
        "Check the grammar near the reported location",
    ),
    ErrorMetadata::new(
        "E086",
        "Syntax",
        Severity::High,
        false,
        true,
        "Too many errors, parsing stopped",
        "Fix the reported errors and re-run",
    ),
    ErrorMetadata::new(
        "E087",
        "Syntax",
        Severity::Critical,
        false,
        true,
        "Maximum nesting depth exceeded",
        "Reduce nesting or raise syntax.max_parse_depth",
    ),
    // AST
    ErrorMetadata::new(
        "E060",
        "Ast",
        Severity::Critical,
        false,
        true,
        "Node location does not enclose a child location",
        "File a bug report against the grammar rule that built the node",
    ),
    ErrorMetadata::new(
        "E061",
        "Ast",
        Severity::Medium,
        true,
        false,
        "Tree could not be serialized",
        "Check the output sink",
    ),
    // Batch
    ErrorMetadata::new(
        "E070",
        "Batch",
        Severity::Medium,
        false,
        true,
        "Batch exceeds the maximum number of buffers",
        "Split the batch",
    ),
    ErrorMetadata::new(
        "E071",
        "Batch",
        Severity::Critical,
        false,
        true,
        "Batch worker thread failed",
        "File a bug report with the failing input",
    ),
    // Success
    ErrorMetadata::new(
        "I001",
        "Success",
        Severity::Low,
        true,
        false,
        "Operation completed",
        "None",
    ),
    ErrorMetadata::new(
        "I004",
        "Success",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "None",
    ),
    ErrorMetadata::new(
        "I010",
        "Success",
        Severity::Low,
        true,
        false,
        "Source accepted and scanner opened",
        "None",
    ),
    ErrorMetadata::new(
        "I020",
        "Success",
        Severity::Low,
        true,
        false,
        "Tokenization finished",
        "None",
    ),
    ErrorMetadata::new(
        "I040",
        "Success",
        Severity::Low,
        true,
        false,
        "Syntax tree constructed",
        "None",
    ),
    ErrorMetadata::new(
        "I041",
        "Success",
        Severity::Low,
        true,
        false,
        "Syntax tree constructed after recovering from errors",
        "Review the reported diagnostics",
    ),
    ErrorMetadata::new(
        "I060",
        "Success",
        Severity::Low,
        true,
        false,
        "Batch parse finished",
        "None",
    ),
];

/// Metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// Every code constant declared above, used by initialization checks
pub fn all_codes() -> Vec<Code> {
    vec![
        system::INTERNAL_ERROR,
        system::INITIALIZATION_FAILURE,
        system::CONFIGURATION_ERROR,
        input::SOURCE_NOT_FOUND,
        input::BUFFER_TOO_LARGE,
        input::PERMISSION_DENIED,
        input::INVALID_ENCODING,
        input::IO_ERROR,
        lexical::INVALID_CHARACTER,
        lexical::UNTERMINATED_STRING,
        lexical::INVALID_NUMBER,
        lexical::LEXEME_TOO_LONG,
        lexical::STRING_TOO_LARGE,
        lexical::INVALID_ESCAPE,
        lexical::COMMENT_TOO_LONG,
        lexical::TOO_MANY_TOKENS,
        lexical::COMMENT_NESTING_TOO_DEEP,
        lexical::UNTERMINATED_COMMENT,
        syntax::UNEXPECTED_END_OF_INPUT,
        syntax::UNCLOSED_DELIMITER,
        syntax::UNEXPECTED_CLOSING_DELIMITER,
        syntax::INVALID_ASSIGNMENT_TARGET,
        syntax::UNEXPECTED_TOKEN,
        syntax::TOO_MANY_ERRORS,
        syntax::MAX_RECURSION_DEPTH,
        ast::ENCLOSURE_VIOLATION,
        ast::SERIALIZATION_FAILURE,
        batch::TOO_MANY_BUFFERS,
        batch::WORKER_FAILURE,
        success::OPERATION_COMPLETED,
        success::SYSTEM_INITIALIZATION_COMPLETED,
        success::INPUT_ACCEPTED,
        success::TOKENIZATION_COMPLETE,
        success::AST_CONSTRUCTION_COMPLETE,
        success::RECOVERED_WITH_DIAGNOSTICS,
        success::BATCH_COMPLETE,
    ]
}
