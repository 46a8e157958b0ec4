//! Logging macros taking a [`Code`](crate::logging::Code), a message, an
//! optional `location = ..` and `"key" => value` context pairs. Context
//! values only need `Display`.

/// Log an error event
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::error($code, $message))
    };

    ($code:expr, $message:expr, location = $location:expr) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message).with_location($location),
        )
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};

    ($code:expr, $message:expr, location = $location:expr, $($key:expr => $value:expr),+) => {{
        let mut event =
            $crate::logging::LogEvent::error($code, $message).with_location($location);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a success event (info level, success code)
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::success($code, $message))
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::success($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::info($message))
    };

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::info($message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a warning, optionally with a specific code
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning($message))
    };

    (code = $code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning_with_code($code, $message))
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::warning_with_code($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::warning($message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a debug message; the event is only built when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::emit($crate::logging::LogEvent::debug($message))
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let mut event = $crate::logging::LogEvent::debug($message);
            $(
                event = event.with_context($key, &format!("{}", $value));
            )+
            $crate::logging::emit(event)
        }
    };
}
