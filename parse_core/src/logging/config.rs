//! Logging configuration: compile-time limits plus runtime user preferences
//!
//! Buffer and message limits come from the generated `compile_time::logging`
//! constants and cannot change at runtime. Verbosity and output format come
//! from [`LoggingPreferences`], set once at startup.

use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences. Only the first call wins.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Installed preferences, or environment-derived defaults
pub fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    if preferences.use_structured_logging && !preferences.enable_console_logging {
        return Err("Structured logging requires console logging to be enabled".to_string());
    }
    Ok(())
}

pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Whether events carry the name of the source being parsed
pub fn include_source_context() -> bool {
    get_runtime_preferences().include_source_context
}

/// Capacity of in-memory log sinks
pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Cut a message down to the configured maximum on a char boundary
pub fn clamp_message(message: &str) -> String {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }
    let mut end = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

/// Validate compile-time constants and any installed preferences
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_MESSAGE_LENGTH < 80 {
        return Err(format!(
            "Max log message length too small: {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Human-readable summary used by system diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Limits (compile-time, profile {}) ===\n\
         - Log buffer size: {}\n\
         - Max message length: {}\n\
         === Preferences (runtime) ===\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Source context: {}",
        crate::config::build_info::profile(),
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_source_context,
    )
}

/// Preferences suited to interactive development
pub fn development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: LogLevel::Debug,
        include_source_context: true,
    }
}

/// Preferences suited to unattended services
pub fn production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: true,
        min_log_level: LogLevel::Warning,
        include_source_context: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_time_limits_are_valid() {
        assert!(validate_config().is_ok());
        assert!(get_log_buffer_size() >= 100);
    }

    #[test]
    fn clamp_message_respects_char_boundaries() {
        let short = "short message";
        assert_eq!(clamp_message(short), short);

        let long = "é".repeat(MAX_LOG_MESSAGE_LENGTH);
        let clamped = clamp_message(&long);
        assert!(clamped.ends_with("..."));
        assert!(clamped.len() <= MAX_LOG_MESSAGE_LENGTH + 3);
    }

    #[test]
    fn structured_without_console_is_rejected() {
        let mut preferences = production_preferences();
        preferences.enable_console_logging = false;
        assert!(validate_preferences(&preferences).is_err());
        assert!(validate_preferences(&development_preferences()).is_ok());
    }

    #[test]
    fn summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Log buffer size"));
        assert!(summary.contains(&LOG_BUFFER_SIZE.to_string()));
    }
}
