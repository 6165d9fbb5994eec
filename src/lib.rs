//! # Rust Event Logger
//!
//! A structured-event logging facility. Each log call becomes a [`LogRecord`]
//! with a level, message and key/value [`Fields`]; records pass a minimum-level
//! gate and a [`HookChain`], then fan out to every registered [`Appender`].
//!
//! ## Features
//!
//! - **Synchronous dispatch**: [`Logger`] writes to each appender in
//!   registration order; a failing appender never stops the others
//! - **Asynchronous dispatch**: [`AsyncLogger`] feeds a bounded queue drained
//!   by a worker pool; a full queue drops instead of blocking
//! - **Size-based rotation**: [`RotatingFileAppender`] keeps `P.1 … P.N` backups
//! - **Sampling**: [`LogSampler`] lets the first N records per key and window
//!   through, then every Mth
//! - **Configuration**: build a logger from a JSON document with [`Config`]
//!
//! ## Example
//!
//! ```
//! use rust_event_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .level(LogLevel::Debug)
//!     .field("service", "billing")
//!     .appender(ConsoleAppender::with_colors(false))
//!     .build();
//!
//! logger.info_with("invoice paid", fields! { "invoice_id" => 1042 });
//! logger.close().unwrap();
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, NetworkAppender, RotatingFileAppender, RotationPolicy};
    pub use crate::config::Config;
    pub use crate::core::{
        Appender, AsyncLogger, AsyncLoggerBuilder, FieldValue, Fields, Formatter, Hook,
        LogLevel, LogRecord, LogSampler, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        OutputFormat, RequestContext, Result, SampledLogger, SamplerMetrics, SamplingConfig,
        TimestampFormat,
    };
    pub use crate::fields;
}

pub use appenders::{ConsoleAppender, NetworkAppender, RotatingFileAppender, RotationPolicy};
pub use config::Config;
pub use core::{
    Appender, AsyncLogger, AsyncLoggerBuilder, FieldValue, Fields, Formatter, Hook, HookChain,
    LogLevel, LogRecord, LogSampler, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    OutputFormat, RequestContext, Result, SampledLogger, SamplerMetrics, SamplingConfig,
    TimestampFormat,
};
