//! Record timestamp layouts
//!
//! The timestamp string is rendered once, when the record is built, so every
//! destination that receives the record sees the same text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Timestamp layout used when building records
///
/// # Examples
///
/// ```
/// use rust_event_logger::core::TimestampFormat;
///
/// let format: TimestampFormat = "iso8601".parse().unwrap();
/// assert_eq!(format, TimestampFormat::Iso8601);
///
/// let custom: TimestampFormat = "%Y-%m-%d".parse().unwrap();
/// assert_eq!(custom, TimestampFormat::Custom("%Y-%m-%d".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    #[default]
    Rfc3339Nano,

    /// RFC 3339 with whole seconds: `2025-01-08T10:30:45Z`
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime layout, e.g. `%d/%b/%Y:%H:%M:%S %z`
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339Nano => datetime.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }

    /// Configuration name of this layout
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TimestampFormat::Rfc3339Nano => "rfc3339nano",
            TimestampFormat::Rfc3339 => "rfc3339",
            TimestampFormat::Iso8601 => "iso8601",
            TimestampFormat::Iso8601Micros => "iso8601_micros",
            TimestampFormat::Unix => "unix",
            TimestampFormat::UnixMillis => "unix_millis",
            TimestampFormat::UnixMicros => "unix_micros",
            TimestampFormat::Custom(layout) => layout,
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = String;

    /// Parse a layout name; anything containing `%` is taken as a strftime layout
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains('%') {
            return Ok(TimestampFormat::Custom(trimmed.to_string()));
        }

        match trimmed.to_lowercase().as_str() {
            "" | "rfc3339nano" | "rfc3339_nano" => Ok(TimestampFormat::Rfc3339Nano),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "iso8601" => Ok(TimestampFormat::Iso8601),
            "iso8601_micros" | "iso8601micros" => Ok(TimestampFormat::Iso8601Micros),
            "unix" => Ok(TimestampFormat::Unix),
            "unix_millis" | "unixmillis" => Ok(TimestampFormat::UnixMillis),
            "unix_micros" | "unixmicros" => Ok(TimestampFormat::UnixMicros),
            _ => Err(format!("Invalid time format: '{}'", s)),
        }
    }
}
