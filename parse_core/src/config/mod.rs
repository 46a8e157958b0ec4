//! Configuration for the parse core
//!
//! Hard limits are generated by `build.rs` from `config/<profile>.toml` and
//! exposed as `compile_time::*` constants. User-facing behavior lives in
//! [`runtime`].

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    ConfigError, InputPreferences, LexicalPreferences, LoggingPreferences, RuntimeConfig,
    SyntaxPreferences,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Profile whose TOML produced the compile-time constants
    pub fn profile() -> &'static str {
        option_env!("PARSE_CORE_BUILD_PROFILE").unwrap_or("development")
    }

    pub fn config_dir() -> &'static str {
        option_env!("PARSE_CORE_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn generated_limits_are_consistent() {
        assert!(compile_time::syntax::MAX_LOOKAHEAD_TOKENS >= 2);
        assert!(compile_time::syntax::MAX_PARSE_DEPTH > 0);
        assert!(compile_time::lexical::TAB_WIDTH > 0);
        assert!(compile_time::lexical::MAX_LEXEME_LENGTH > 0);
        assert!(compile_time::batch::MAX_WORKER_THREADS > 0);
        assert!(compile_time::input::MAX_BUFFER_SIZE > 0);
    }

    #[test]
    fn source_info_names_profile() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}
