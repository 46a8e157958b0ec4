// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    input: InputLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct InputLimits {
    max_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_lexeme_length: usize,
    max_string_size: usize,
    max_comment_length: usize,
    max_comment_nesting: u32,
    max_token_count: usize,
    tab_width: u32,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_context_stack_depth: usize,
    max_recovery_scan_tokens: usize,
    max_lookahead_tokens: usize,
    max_diagnostics: usize,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
    max_buffers_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PARSE_CORE_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PARSE_CORE_CONFIG_DIR");

    let profile =
        env::var("PARSE_CORE_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PARSE_CORE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the parse_core directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_BUFFER_SIZE: usize = 1_000_000_000;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 1024;

    if config.input.max_buffer_size > ABSOLUTE_MAX_BUFFER_SIZE {
        panic!("LIMITS: max_buffer_size exceeds absolute maximum");
    }

    if config.syntax.max_parse_depth == 0 || config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH {
        panic!("LIMITS: max_parse_depth must be in 1..={}", ABSOLUTE_MAX_PARSE_DEPTH);
    }

    if config.syntax.max_lookahead_tokens < 2 {
        panic!("LIMITS: max_lookahead_tokens must be at least 2");
    }

    if config.syntax.max_diagnostics == 0 {
        panic!("LIMITS: max_diagnostics must be at least 1");
    }

    if config.lexical.tab_width == 0 || config.lexical.tab_width > 16 {
        panic!("LIMITS: tab_width must be in 1..=16");
    }

    if config.lexical.max_comment_nesting == 0 {
        panic!("LIMITS: max_comment_nesting must be at least 1");
    }

    if config.batch.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads must be at least 1");
    }

    if profile == "production" {
        if config.input.max_buffer_size > 50_000_000 {
            panic!("PRODUCTION: max_buffer_size too high for production");
        }
        if config.syntax.max_parse_depth > 256 {
            panic!("PRODUCTION: max_parse_depth too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod input {{
        pub const MAX_BUFFER_SIZE: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_LEXEME_LENGTH: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_COMMENT_LENGTH: usize = {};
        pub const MAX_COMMENT_NESTING: u32 = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const TAB_WIDTH: u32 = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_CONTEXT_STACK_DEPTH: usize = {};
        pub const MAX_RECOVERY_SCAN_TOKENS: usize = {};
        pub const MAX_LOOKAHEAD_TOKENS: usize = {};
        pub const MAX_DIAGNOSTICS: usize = {};
    }}

    pub mod batch {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_BUFFERS_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        // Input
        config.input.max_buffer_size,
        // Lexical
        config.lexical.max_lexeme_length,
        config.lexical.max_string_size,
        config.lexical.max_comment_length,
        config.lexical.max_comment_nesting,
        config.lexical.max_token_count,
        config.lexical.tab_width,
        // Syntax
        config.syntax.max_parse_depth,
        config.syntax.max_context_stack_depth,
        config.syntax.max_recovery_scan_tokens,
        config.syntax.max_lookahead_tokens,
        config.syntax.max_diagnostics,
        // Batch
        config.batch.max_worker_threads,
        config.batch.max_buffers_per_batch,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
