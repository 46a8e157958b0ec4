//! Runtime preferences
//!
//! Defaults read `PARSE_CORE_*` environment variables (see [`env_vars`]).
//! A TOML preferences file can override any subset of fields; missing
//! fields fall back to the environment-derived defaults.

pub use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read preferences file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid preferences TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConfigError::Io { .. } => crate::logging::codes::input::IO_ERROR,
            ConfigError::Parse(_) => crate::logging::codes::system::CONFIGURATION_ERROR,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPreferences {
    /// Drop a leading UTF-8 byte-order mark before scanning
    pub strip_byte_order_mark: bool,
}

impl Default for InputPreferences {
    fn default() -> Self {
        Self {
            strip_byte_order_mark: env_flag(env_vars::INPUT_STRIP_BOM, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Emit comments as trivia tokens instead of skipping them
    pub retain_comments: bool,

    /// Count tokens per class in [`LexicalMetrics`](crate::lexical::LexicalMetrics)
    pub collect_detailed_metrics: bool,

    /// Log every token at debug level
    pub trace_tokens: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            retain_comments: env_flag(env_vars::LEXICAL_RETAIN_COMMENTS, false),
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
            trace_tokens: env_flag(env_vars::LEXICAL_TRACE_TOKENS, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Keep parsing after errors, producing Error nodes
    pub enable_recovery: bool,

    /// Attach the rule context chain to diagnostics
    pub include_context_in_diagnostics: bool,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            enable_recovery: env_flag(env_vars::SYNTAX_ENABLE_RECOVERY, false),
            include_context_in_diagnostics: env_flag(env_vars::SYNTAX_INCLUDE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Tag events with the name of the source being parsed
    pub include_source_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            include_source_context: env_flag(env_vars::LOGGING_INCLUDE_SOURCE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub input: InputPreferences,
    pub lexical: LexicalPreferences,
    pub syntax: SyntaxPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Input
    pub const INPUT_STRIP_BOM: &str = "PARSE_CORE_INPUT_STRIP_BOM";

    // Lexical
    pub const LEXICAL_RETAIN_COMMENTS: &str = "PARSE_CORE_LEXICAL_RETAIN_COMMENTS";
    pub const LEXICAL_DETAILED_METRICS: &str = "PARSE_CORE_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_TRACE_TOKENS: &str = "PARSE_CORE_LEXICAL_TRACE_TOKENS";

    // Syntax
    pub const SYNTAX_ENABLE_RECOVERY: &str = "PARSE_CORE_SYNTAX_ENABLE_RECOVERY";
    pub const SYNTAX_INCLUDE_CONTEXT: &str = "PARSE_CORE_SYNTAX_INCLUDE_CONTEXT";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PARSE_CORE_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PARSE_CORE_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PARSE_CORE_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "PARSE_CORE_LOGGING_INCLUDE_SOURCE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [syntax]
            enable_recovery = true

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(config.syntax.enable_recovery);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert_eq!(config.lexical, LexicalPreferences::default());
        assert_eq!(config.input, InputPreferences::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = RuntimeConfig::from_toml_str("[syntax]\nenable_recovery = \"sometimes\"");
        let err = result.unwrap_err();
        assert_eq!(err.error_code(), crate::logging::codes::system::CONFIGURATION_ERROR);
        assert_matches!(err, ConfigError::Parse(_));
    }

    #[test]
    fn preferences_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "[lexical]\nretain_comments = true\n").unwrap();

        let config = RuntimeConfig::from_toml_file(&path).unwrap();
        assert!(config.lexical.retain_comments);
    }

    #[test]
    fn missing_preferences_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeConfig::from_toml_file(dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn env_var_names_share_prefix() {
        for name in [
            env_vars::INPUT_STRIP_BOM,
            env_vars::LEXICAL_RETAIN_COMMENTS,
            env_vars::SYNTAX_ENABLE_RECOVERY,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("PARSE_CORE_"));
        }
    }
}
