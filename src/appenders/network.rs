//! Network appender for remote logging
//!
//! Sends newline-delimited records to a remote server over TCP.
//! Useful for centralized logging in distributed systems.

use crate::core::{Appender, Formatter, LogRecord, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

struct Connection {
    stream: Option<TcpStream>,
    closed: bool,
}

/// Network appender that sends logs to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use rust_event_logger::appenders::NetworkAppender;
/// use rust_event_logger::prelude::*;
///
/// let appender = NetworkAppender::new("127.0.0.1:8080")
///     .expect("Failed to connect to log server");
///
/// let logger = Logger::new();
/// logger.add_appender(appender);
/// logger.info("This log will be sent to 127.0.0.1:8080");
/// ```
pub struct NetworkAppender {
    address: String,
    formatter: Formatter,
    write_timeout: Duration,
    reconnect_on_error: bool,
    connection: Mutex<Connection>,
}

impl NetworkAppender {
    /// Connect to `addr` (e.g. "localhost:8080") with JSON lines output
    ///
    /// # Errors
    ///
    /// Returns error if connection fails
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        Self::with_timeout(addr, DEFAULT_WRITE_TIMEOUT)
    }

    /// Connect with a custom write timeout
    ///
    /// # Errors
    ///
    /// Returns error if connection fails
    pub fn with_timeout(addr: impl Into<String>, write_timeout: Duration) -> Result<Self> {
        let address = addr.into();
        let stream = Self::connect(&address, write_timeout)?;

        Ok(Self {
            address,
            formatter: Formatter::json(),
            write_timeout,
            reconnect_on_error: true,
            connection: Mutex::new(Connection {
                stream: Some(stream),
                closed: false,
            }),
        })
    }

    /// Enable or disable one reconnect-and-resend attempt on write failure
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(address: &str, write_timeout: Duration) -> Result<TcpStream> {
        let stream = TcpStream::connect(address).map_err(|e| {
            LoggerError::io_operation("connecting", format!("cannot reach {}", address), e)
        })?;
        stream.set_write_timeout(Some(write_timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn send(&self, payload: &[u8]) -> Result<()> {
        let mut connection = self.connection.lock();
        if connection.closed {
            return Err(LoggerError::appender_closed(self.name()));
        }

        let first_error = match connection.stream.as_mut() {
            Some(stream) => match stream.write_all(payload) {
                Ok(()) => return Ok(()),
                Err(e) => e.to_string(),
            },
            None => "not connected".to_string(),
        };

        // Connection lost
        connection.stream = None;
        if !self.reconnect_on_error {
            return Err(LoggerError::writer(format!(
                "Failed to send log to {}: {}",
                self.address, first_error
            )));
        }

        match Self::connect(&self.address, self.write_timeout) {
            Ok(mut stream) => {
                stream.write_all(payload)?;
                connection.stream = Some(stream);
                Ok(())
            }
            Err(reconnect_err) => Err(LoggerError::writer(format!(
                "Failed to send log and reconnect: {} (reconnect: {})",
                first_error, reconnect_err
            ))),
        }
    }
}

impl Appender for NetworkAppender {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.format(record)?;
        line.push('\n');
        self.send(line.as_bytes())
    }

    fn flush(&self) -> Result<()> {
        let mut connection = self.connection.lock();
        if let Some(ref mut stream) = connection.stream {
            stream.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut connection = self.connection.lock();
        if connection.closed {
            return Ok(());
        }
        connection.closed = true;
        if let Some(mut stream) = connection.stream.take() {
            let _ = stream.flush();
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                if e.kind() != std::io::ErrorKind::NotConnected {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "network"
    }
}
