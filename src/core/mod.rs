//! Core logger types and traits

pub mod appender;
pub mod async_logger;
pub mod context;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod hooks;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod sampling;
pub mod timestamp;

pub use appender::Appender;
pub use async_logger::{
    AsyncLogger, AsyncLoggerBuilder, DEFAULT_BUFFER_SIZE, DEFAULT_SHUTDOWN_TIMEOUT,
    DEFAULT_WORKERS,
};
pub use context::RequestContext;
pub use error::{LoggerError, Result};
pub use fields::{FieldValue, Fields};
pub use formatter::{Formatter, OutputFormat};
pub use hooks::{
    redact_fields, ContextExtractor, ErrorHandler, Hook, HookChain, OverflowCallback,
};
pub use log_level::LogLevel;
pub use logger::{FatalAction, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use record::{LogRecord, RecordBuilder};
pub use sampling::{
    LogSampler, SampledLogger, SamplerMetrics, SamplingConfig, DEFAULT_SAMPLING_INTERVAL,
};
pub use timestamp::TimestampFormat;
