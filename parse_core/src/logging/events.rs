//! Log events emitted by the scanner, the parser and the batch runner

use super::codes::{self, Code, Severity};
use crate::syntax::Diagnostic;
use crate::utils::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Verbosity, most severe first: `Error < Warning < Info < Debug`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Accepts names (`warn`, `WARNING`) and numeric levels (`0`..`3`)
    pub fn parse(level: &str) -> Option<Self> {
        match level.to_lowercase().as_str() {
            "error" | "0" => Some(LogLevel::Error),
            "warning" | "warn" | "1" => Some(LogLevel::Warning),
            "info" | "2" => Some(LogLevel::Info),
            "debug" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

/// Codes for events that have no registered code of their own
const UNCODED_WARNING: Code = Code::new("W000");
const UNCODED_INFO: Code = Code::new("I000");
const UNCODED_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Key/value pairs from the logging macros, plus `source` when a source
    /// context was active
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: super::config::clamp_message(message),
            location: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, UNCODED_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, UNCODED_INFO, message)
    }

    /// Success events are info events carrying a success code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, UNCODED_DEBUG, message)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_source(self, source: &str) -> Self {
        self.with_context("source", source)
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.code.as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    /// `[LEVEL] CODE - message at l:c-c`
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Multi-line form with the registry entry and context pairs
    pub fn format_detailed(&self) -> String {
        let mut output = self.to_string();
        let code = self.code.as_str();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity().as_str()));

        if let Some(metadata) = codes::get_error_metadata(code) {
            if self.level == LogLevel::Error {
                output.push_str(&format!("\n  Recoverable: {}", metadata.recoverable));
            }
            output.push_str(&format!("\n  Description: {}", metadata.description));
            output.push_str(&format!("\n  Recommended action: {}", metadata.recommended_action));
        }

        for (key, value) in &self.context {
            output.push_str(&format!("\n  {}: {}", key, value));
        }

        output
    }

    /// One JSON object, timestamps in RFC 3339
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level.as_str(), self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

/// A diagnostic becomes an event at the level its severity implies
impl From<&Diagnostic> for LogEvent {
    fn from(diagnostic: &Diagnostic) -> Self {
        let level = match diagnostic.severity {
            Severity::Critical | Severity::High => LogLevel::Error,
            Severity::Medium | Severity::Low => LogLevel::Warning,
        };

        let event = Self::new(level, diagnostic.code, &diagnostic.message)
            .with_location(diagnostic.location);
        match &diagnostic.context {
            Some(rules) => event.with_context("rules", rules),
            None => event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxError;
    use crate::utils::Position;

    #[test]
    fn error_events_know_their_category() {
        let event = LogEvent::error(codes::input::SOURCE_NOT_FOUND, "Source not found");

        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "Input");
    }

    #[test]
    fn plain_format_ends_with_location() {
        let location = Location::new(Position::new(3, 5), Position::new(3, 9));
        let event = LogEvent::error(codes::lexical::INVALID_CHARACTER, "Invalid character")
            .with_location(location);
        let formatted = event.format();

        assert!(formatted.starts_with("[ERROR] E020 - Invalid character"));
        assert!(formatted.ends_with("at 3:5-9"));
    }

    #[test]
    fn detailed_format_lists_context() {
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "unexpected ')'")
            .with_context("expected", "expression")
            .with_source("main.src");
        let detailed = event.format_detailed();

        assert!(detailed.contains("Category: Syntax"));
        assert!(detailed.contains("expected: expression"));
        assert!(detailed.contains("source: main.src"));
    }

    #[test]
    fn json_form_is_flat_and_skips_empty_fields() {
        let event = LogEvent::error(codes::input::PERMISSION_DENIED, "Access denied")
            .with_location(Location::point(2, 1))
            .with_context("file", "test.src");

        let value: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["code"], "E009");
        assert_eq!(value["location"]["start"]["line"], 2);
        assert_eq!(value["context"]["file"], "test.src");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));

        let bare: serde_json::Value =
            serde_json::from_str(&LogEvent::info("hello").format_json().unwrap()).unwrap();
        assert!(bare.get("location").is_none());
        assert!(bare.get("context").is_none());
    }

    #[test]
    fn diagnostics_convert_with_their_location() {
        let error = SyntaxError::unexpected_token("';'", "'}'", Location::point(7, 3));
        let diagnostic = Diagnostic::from_error(&error, Some("program > block".to_string()));

        let event = LogEvent::from(&diagnostic);
        assert_eq!(event.code, codes::syntax::UNEXPECTED_TOKEN);
        assert_eq!(event.location, Some(Location::point(7, 3)));
        assert_eq!(event.context.get("rules").map(String::as_str), Some("program > block"));
    }

    #[test]
    fn log_level_parsing_and_order() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("0"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("Info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("3"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert!(LogLevel::Error < LogLevel::Debug);
    }
}
