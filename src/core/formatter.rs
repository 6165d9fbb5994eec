//! Rendering of records for the bundled appenders
//!
//! - Text: `<time> <LEVEL> [caller] message k=v ...`
//! - Json: one object per line with `time`, `level`, `message`, `caller`, `fields`

use super::error::{LoggerError, Result};
use super::record::LogRecord;
use colored::Colorize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `2025-01-08T10:30:45Z INFO  [main.rs:12] Request processed status=200`
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"time":"2025-01-08T10:30:45Z","level":"INFO","message":"Request processed"}`
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: '{}'", s)),
        }
    }
}

/// Turns a record into one output line (without trailing newline)
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    format: OutputFormat,
    colors: bool,
    pretty: bool,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colors: false,
            pretty: false,
        }
    }

    pub fn text() -> Self {
        Self::new(OutputFormat::Text)
    }

    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    /// Colour the level name (text only)
    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Multi-line output: indented JSON, or one field per line for text
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn format(&self, record: &LogRecord) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.format_text(record)),
            OutputFormat::Json => self.format_json(record),
        }
    }

    fn format_text(&self, record: &LogRecord) -> String {
        let level = format!("{:5}", record.level.to_str());
        let level = if self.colors {
            level.color(record.level.color_code()).to_string()
        } else {
            level
        };

        let mut line = format!("{} {}", record.timestamp, level);
        if let Some(ref caller) = record.caller {
            let _ = write!(line, " [{}]", caller);
        }
        line.push(' ');
        line.push_str(&sanitize_message(&record.message));

        for (key, value) in record.fields.iter() {
            if self.pretty {
                let _ = write!(line, "\n    {}={}", key, value);
            } else {
                let _ = write!(line, " {}={}", key, value);
            }
        }

        line
    }

    fn format_json(&self, record: &LogRecord) -> Result<String> {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "time".to_string(),
            serde_json::Value::String(record.timestamp.clone()),
        );
        obj.insert(
            "level".to_string(),
            serde_json::Value::String(record.level.to_str().to_string()),
        );
        obj.insert(
            "message".to_string(),
            serde_json::Value::String(record.message.clone()),
        );
        if let Some(ref caller) = record.caller {
            obj.insert("caller".to_string(), serde_json::Value::String(caller.clone()));
        }
        if !record.fields.is_empty() {
            obj.insert(
                "fields".to_string(),
                serde_json::Value::Object(record.fields.to_json_map()),
            );
        }

        let value = serde_json::Value::Object(obj);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.map_err(LoggerError::from)
    }
}

/// Escape line breaks and tabs so one record cannot forge extra log lines
fn sanitize_message(message: &str) -> String {
    if !message.contains(['\n', '\r', '\t']) {
        return message.to_string();
    }
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
