//! Process-wide logging for the parse pipeline
//!
//! A single [`LoggingService`] is installed once per process. Each thread
//! can additionally name the source it is working on; events emitted while
//! a source context is active carry that name, which keeps batch output
//! readable when many buffers are parsed in parallel.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, FileLogger, Logger, LoggingService, MemoryLogger, NullLogger, OutputFormat,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the installed preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in codes::all_codes() {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Install the logging preferences of `config`, then the global service
pub fn init_logging(config: &crate::config::RuntimeConfig) -> Result<(), String> {
    config::init_runtime_preferences(config.logging.clone())?;
    init_global_logging()
}

/// Install a caller-built service, e.g. one backed by a [`MemoryLogger`]
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Restores the previous source context when dropped
pub struct SourceContextGuard {
    previous: Option<String>,
}

impl Drop for SourceContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SOURCE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    }
}

/// Name the source this thread is working on until the guard drops
pub fn enter_source_context(name: &str) -> SourceContextGuard {
    let previous = SOURCE_CONTEXT.with(|ctx| ctx.borrow_mut().replace(name.to_string()));
    SourceContextGuard { previous }
}

/// Run `f` with `name` as this thread's source context
pub fn with_source_context<F, R>(name: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = enter_source_context(name);
    f()
}

pub fn current_source_context() -> Option<String> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Attach thread context and hand the event to the global service.
/// Events are dropped when logging was never initialized.
pub fn emit(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let event = match current_source_context() {
        Some(source) if config::include_source_context() => event.with_source(&source),
        _ => event,
    };

    logger.log_event(event);
}

/// Error logging that falls back to stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}

/// Report logging state and configuration
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    diagnostics.push_str(&format!("Registered codes: {}\n", codes::all_codes().len()));
    if let Some(source) = current_source_context() {
        diagnostics.push_str(&format!("Current source: {}\n", source));
    }
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}
