//! The logging service and the sinks it can write to

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for events that passed the service's level filter
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// How a text sink renders an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `[LEVEL] CODE - message at l:c-c`
    Plain,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    fn render(self, event: &LogEvent) -> String {
        match self {
            OutputFormat::Plain => event.format(),
            // Fall back to the plain line rather than losing the event
            OutputFormat::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

/// Filters events by level and forwards them to one sink
pub struct LoggingService {
    sink: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    /// Console output as described by `preferences`; silent when console
    /// logging is off
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let sink: Arc<dyn Logger> = if !preferences.enable_console_logging {
            Arc::new(NullLogger)
        } else if preferences.use_structured_logging {
            Arc::new(ConsoleLogger::new(OutputFormat::Json))
        } else {
            Arc::new(ConsoleLogger::new(OutputFormat::Plain))
        };

        Self::new(sink, preferences.min_log_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.sink.log(&event);
        }
    }
}

pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Errors go to stderr, everything else to stdout
pub struct ConsoleLogger {
    format: OutputFormat,
}

impl ConsoleLogger {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Ring buffer of recent events. The oldest event is dropped once the
/// capacity is reached.
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_log_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.code == code).cloned().collect()
    }

    pub fn contains_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.code == code)
    }

    /// Events logged while parsing the named source
    pub fn from_source(&self, source: &str) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.context.get("source").map(String::as_str) == Some(source))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> EventSummary {
        let events = self.lock();
        let count = |level: LogLevel| events.iter().filter(|e| e.level == level).count();

        EventSummary {
            total: events.len(),
            errors: count(LogLevel::Error),
            warnings: count(LogLevel::Warning),
            halting: events.iter().filter(|e| e.requires_halt()).count(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Events whose code stops a parse outright
    pub halting: usize,
}

/// Appends one rendered event per line to a file
pub struct FileLogger {
    path: PathBuf,
    format: OutputFormat,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open `path` for appending, creating parent directories
    pub fn new<P: AsRef<Path>>(path: P, format: OutputFormat) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            format,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Write failures are dropped; reporting them would log again
        let _ = writeln!(file, "{}", line);
    }
}

/// Service built from the installed logging preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::from_preferences(&config::get_runtime_preferences())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Location;

    #[test]
    fn memory_logger_summarizes_by_level() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(codes::lexical::INVALID_CHARACTER, "bad char"));
        logger.log(&LogEvent::error(codes::syntax::MAX_RECURSION_DEPTH, "too deep"));
        logger.log(&LogEvent::warning_with_code(codes::syntax::UNEXPECTED_TOKEN, "recovered"));

        assert_eq!(logger.len(), 4);
        assert!(logger.contains_code(codes::lexical::INVALID_CHARACTER));
        assert_eq!(
            logger.summary(),
            EventSummary {
                total: 4,
                errors: 2,
                warnings: 1,
                halting: 1,
            }
        );

        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn memory_logger_drops_oldest_when_full() {
        let logger = MemoryLogger::with_capacity(2);
        logger.log(&LogEvent::info("first"));
        logger.log(&LogEvent::info("second"));
        logger.log(&LogEvent::info("third"));

        let messages: Vec<String> = logger.events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn events_are_grouped_by_source() {
        let logger = MemoryLogger::new();
        logger.log(&LogEvent::info("a").with_source("one.src"));
        logger.log(&LogEvent::info("b").with_source("two.src"));
        logger.log(&LogEvent::info("c").with_source("one.src"));

        assert_eq!(logger.from_source("one.src").len(), 2);
        assert!(logger.from_source("three.src").is_empty());
    }

    #[test]
    fn service_filters_by_level() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Warning);

        service.log_event(LogEvent::error(codes::input::IO_ERROR, "read failed"));
        service.log_event(LogEvent::warning("careful"));
        service.log_event(LogEvent::info("ignored"));
        service.log_event(LogEvent::debug("ignored too"));

        assert_eq!(logger.len(), 2);
        assert!(service.should_log(LogLevel::Error));
        assert!(!service.should_log(LogLevel::Info));
    }

    #[test]
    fn service_keeps_event_locations() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_event(
            LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "unexpected ';'")
                .with_location(Location::point(4, 2)),
        );

        let events = logger.with_code(codes::syntax::UNEXPECTED_TOKEN);
        assert_eq!(events[0].location, Some(Location::point(4, 2)));
    }

    #[test]
    fn disabled_console_is_silent() {
        let preferences = LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: false,
            min_log_level: LogLevel::Debug,
            include_source_context: true,
        };
        let service = LoggingService::from_preferences(&preferences);
        assert_eq!(service.min_level(), LogLevel::Debug);
        service.log_event(LogEvent::info("goes nowhere"));
    }

    #[test]
    fn file_logger_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("parse.log");
        let logger = FileLogger::new(&path, OutputFormat::Json).unwrap();

        logger.log(&LogEvent::error(codes::input::SOURCE_NOT_FOUND, "missing"));
        logger.log(&LogEvent::info("kept"));

        let contents = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"code\":\"E005\""));
    }
}
