//! Log record and record builder

use super::context::RequestContext;
use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::Location;

/// Snapshot of one log event
///
/// Hooks receive the record mutably and may rewrite the message or fields.
/// Once the hook chain has run, destinations only ever see `&LogRecord`.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(skip)]
    pub time: DateTime<Utc>,
    /// `time` rendered with the logger's timestamp layout
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub fields: Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    /// Request context the record was logged under; never serialized
    #[serde(skip)]
    pub context: Option<RequestContext>,
}

impl LogRecord {
    /// Build a record stamped now with the default timestamp layout
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        RecordBuilder::new(level, message).build(&TimestampFormat::default())
    }

    pub fn builder(level: LogLevel, message: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(level, message)
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }
}

/// Assembles a [`LogRecord`] from the already-merged inputs of a log call
#[derive(Debug)]
pub struct RecordBuilder {
    level: LogLevel,
    message: String,
    fields: Fields,
    caller: Option<&'static Location<'static>>,
    context: Option<RequestContext>,
    time: Option<DateTime<Utc>>,
}

impl RecordBuilder {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Fields::new(),
            caller: None,
            context: None,
            time: None,
        }
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn caller(mut self, location: &'static Location<'static>) -> Self {
        self.caller = Some(location);
        self
    }

    pub fn context(mut self, context: Option<&RequestContext>) -> Self {
        self.context = context.cloned();
        self
    }

    /// Pin the record time instead of reading the clock at build time
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn build(self, timestamp_format: &TimestampFormat) -> LogRecord {
        let time = self.time.unwrap_or_else(Utc::now);
        LogRecord {
            timestamp: timestamp_format.format(&time),
            time,
            level: self.level,
            message: self.message,
            fields: self.fields,
            caller: self.caller.map(format_caller),
            context: self.context,
        }
    }
}

/// Render a source location as `file-name:line`, without directories
pub fn format_caller(location: &Location<'_>) -> String {
    let file = location
        .file()
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_else(|| location.file());
    format!("{}:{}", file, location.line())
}
