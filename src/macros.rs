//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They work with
//! anything that has a `log(level, message, fields)` method, i.e. [`Logger`]
//! and [`AsyncLogger`].
//!
//! [`Logger`]: crate::core::Logger
//! [`AsyncLogger`]: crate::core::AsyncLogger
//!
//! # Examples
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use rust_event_logger::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured fields
//! let user_id = 42;
//! info!(logger, { "user_id" => user_id, "action" => "login" }, "User {} logged in", user_id);
//! ```

/// Build a [`Fields`](crate::core::Fields) map from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use rust_event_logger::fields;
///
/// let fields = fields! { "invoice_id" => 1042, "paid" => true };
/// assert_eq!(fields.len(), 2);
///
/// let empty = fields! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::core::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::core::Fields::new();
        $(
            fields.insert($key, $value);
        )+
        fields
    }};
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_event_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, { "code" => 429 }, "Throttled");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::fields!($($key => $value),*))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::core::Fields::new())
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_event_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_event_logger::info;
/// info!(logger, "Application started");
/// info!(logger, { "port" => 8080 }, "Listening");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_event_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal Server Error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, then run the logger's fatal action.
///
/// By default the fatal action terminates the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Fatal, $($arg)+)
    };
}
