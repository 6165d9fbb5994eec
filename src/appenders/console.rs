//! Console appender implementation

use crate::core::{Appender, Formatter, LogRecord, LoggerError, Result};
use parking_lot::Mutex;
use std::io::{self, Write};

/// Writes one formatted line per record to stdout or an injected writer
pub struct ConsoleAppender {
    formatter: Formatter,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleAppender {
    /// Coloured text on stdout
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            formatter: Formatter::text().with_colors(use_colors),
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Write to stderr instead of stdout
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr()).with_formatter(Formatter::text().with_colors(true))
    }

    /// Write to any `Write` sink, uncoloured text by default
    ///
    /// # Example
    ///
    /// ```
    /// use rust_event_logger::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::with_writer(Vec::<u8>::new());
    /// ```
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            formatter: Formatter::text(),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Set the line formatter for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use rust_event_logger::appenders::ConsoleAppender;
    /// use rust_event_logger::core::Formatter;
    ///
    /// let appender = ConsoleAppender::new().with_formatter(Formatter::json());
    /// ```
    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let output = self.formatter.format(record)?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", output)
            .map_err(|e| LoggerError::io_operation("writing to console", "write failed", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.flush()
    }

    fn name(&self) -> &str {
        "console"
    }
}
