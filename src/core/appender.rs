//! Appender trait for log output destinations

use super::{error::Result, record::LogRecord};

/// A destination records are fanned out to
///
/// Appenders are shared between the caller's thread and async workers, so
/// every method takes `&self` and implementations guard their own state.
/// `append` may be called concurrently; a record is never split across calls.
pub trait Appender: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release the destination. Called at most once by a logger.
    fn close(&self) -> Result<()>;

    fn name(&self) -> &str;
}
