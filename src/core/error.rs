//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Write attempted on an appender that has been closed
    #[error("Appender '{name}' is closed")]
    AppenderClosed { name: String },

    /// Appender panicked while handling a record
    #[error("Appender '{name}' panicked: {message}")]
    AppenderPanicked { name: String, message: String },

    /// A hook vetoed delivery of a record
    #[error("Record rejected by hook: {0}")]
    HookRejected(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn appender_closed(name: impl Into<String>) -> Self {
        LoggerError::AppenderClosed { name: name.into() }
    }

    pub fn appender_panicked(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderPanicked {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create the error a hook returns to drop the current record
    pub fn hook_rejected<S: Into<String>>(reason: S) -> Self {
        LoggerError::HookRejected(reason.into())
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("file", "path is required");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_appender("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));

        let err = LoggerError::hook_rejected("contains secret");
        assert!(matches!(err, LoggerError::HookRejected(_)));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("level", "invalid log level: verbose");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for level: invalid log level: verbose"
        );

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::appender_closed("rotating_file");
        assert_eq!(err.to_string(), "Appender 'rotating_file' is closed");

        let err = LoggerError::appender_panicked("console", "boom");
        assert_eq!(err.to_string(), "Appender 'console' panicked: boom");
    }

    /// Every variant belongs to one of the configuration, destination or
    /// hook taxonomies; no catch-all remains
    #[test]
    fn test_every_variant_has_a_taxonomy() {
        fn taxonomy(err: &LoggerError) -> &'static str {
            match err {
                LoggerError::InvalidConfiguration { .. } | LoggerError::JsonError(_) => "config",
                LoggerError::IoOperation { .. }
                | LoggerError::IoError(_)
                | LoggerError::FileAppenderError { .. }
                | LoggerError::FileRotationError { .. }
                | LoggerError::WriterError(_)
                | LoggerError::AppenderClosed { .. }
                | LoggerError::AppenderPanicked { .. } => "destination",
                LoggerError::HookRejected(_) => "hook",
            }
        }

        assert_eq!(taxonomy(&LoggerError::config("level", "bad")), "config");
        assert_eq!(taxonomy(&LoggerError::writer("broken pipe")), "destination");
        assert_eq!(taxonomy(&LoggerError::file_rotation("app.log", "busy")), "destination");
        assert_eq!(taxonomy(&LoggerError::hook_rejected("pii")), "hook");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
