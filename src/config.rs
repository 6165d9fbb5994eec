//! JSON configuration surface
//!
//! ```json
//! {
//!   "logger": {
//!     "level": "debug",
//!     "format": "json",
//!     "time_format": "rfc3339",
//!     "add_caller": false,
//!     "stdout": { "enabled": true, "disable_colors": true },
//!     "file": { "enabled": true, "path": "logs/app.log", "max_size_mb": 10, "max_backups": 3 }
//!   }
//! }
//! ```
//!
//! Every key is optional. `add_caller` is on unless set to `false`.

use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy};
use crate::core::{
    Formatter, LogLevel, Logger, LoggerError, OutputFormat, Result, TimestampFormat,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// constants to define default values
const LEVEL: &str = "info";
const FORMAT: &str = "text";
const TIME_FORMAT: &str = "rfc3339nano";
const ADD_CALLER: bool = true;

// helper functions
fn level() -> String {
    LEVEL.to_string()
}

fn format() -> String {
    FORMAT.to_string()
}

fn time_format() -> String {
    TIME_FORMAT.to_string()
}

fn add_caller() -> bool {
    ADD_CALLER
}

// struct definitions
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub logger: LoggerSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggerSettings {
    /// Minimum level: debug, info, warn, error or fatal
    #[serde(default = "level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "format")]
    pub format: String,
    #[serde(default = "time_format")]
    pub time_format: String,
    #[serde(default = "add_caller")]
    pub add_caller: bool,
    #[serde(default)]
    pub stdout: StdoutSettings,
    #[serde(default)]
    pub file: FileSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StdoutSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub disable_colors: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub path: String,
    /// 0 disables rotation
    #[serde(default)]
    pub max_size_mb: u64,
    #[serde(default)]
    pub max_backups: usize,
}

// trait implementations
impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: level(),
            format: format(),
            time_format: time_format(),
            add_caller: add_caller(),
            stdout: StdoutSettings::default(),
            file: FileSettings::default(),
        }
    }
}

// implementation
impl Config {
    /// Read a JSON configuration file; absent keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading config file",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON configuration document
    ///
    /// # Errors
    ///
    /// Returns error if `json` is malformed or a value has the wrong type
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every setting, failing on the first invalid one
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the offending setting
    pub fn validate(&self) -> Result<()> {
        self.logger.level()?;
        self.logger.output_format()?;
        self.logger.timestamp_format()?;

        if self.logger.file.enabled && self.logger.file.path.trim().is_empty() {
            return Err(LoggerError::config(
                "file",
                "file path is required when file output is enabled",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn level(&self) -> Result<LogLevel> {
        self.level
            .parse()
            .map_err(|e: String| LoggerError::config("level", e))
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format
            .parse()
            .map_err(|e: String| LoggerError::config("format", e))
    }

    pub fn timestamp_format(&self) -> Result<TimestampFormat> {
        self.time_format
            .parse()
            .map_err(|e: String| LoggerError::config("time_format", e))
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        if self.file.max_size_mb > 0 {
            RotationPolicy::with_max_size_mb(self.file.max_size_mb, self.file.max_backups)
        } else {
            RotationPolicy::disabled()
        }
    }
}

impl Logger {
    /// Build a logger from validated settings
    ///
    /// Stdout text honours `disable_colors`; file output is never coloured.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the log file cannot
    /// be opened
    pub fn from_config(config: &Config) -> Result<Logger> {
        config.validate()?;
        let settings = &config.logger;
        let format = settings.output_format()?;

        let mut builder = Logger::builder()
            .level(settings.level()?)
            .add_caller(settings.add_caller)
            .timestamp_format(settings.timestamp_format()?);

        if settings.stdout.enabled {
            let formatter = match format {
                OutputFormat::Text => Formatter::text().with_colors(!settings.stdout.disable_colors),
                OutputFormat::Json => Formatter::json(),
            };
            builder = builder.appender(ConsoleAppender::new().with_formatter(formatter));
        }

        if settings.file.enabled {
            let file = RotatingFileAppender::with_policy(&settings.file.path, settings.rotation_policy())?
                .with_formatter(Formatter::new(format));
            builder = builder.appender(file);
        }

        Ok(builder.build())
    }

    /// Load, validate and build in one step
    ///
    /// # Errors
    ///
    /// Returns error if loading, validation or construction fails
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Logger> {
        let config = Config::load(path)?;
        Logger::from_config(&config)
    }
}
