//! Synchronous dispatcher
//!
//! A log call runs entirely on the caller's thread:
//! level gate, field merge, record build, hook chain, then fan-out to every
//! appender in registration order. Appender failures go to the error handler
//! and never reach the call site.

use super::{
    appender::Appender,
    context::RequestContext,
    error::{LoggerError, Result},
    fields::{FieldValue, Fields},
    hooks::{ContextExtractor, ErrorHandler, Hook, HookChain},
    log_level::{should_emit, LogLevel},
    metrics::LoggerMetrics,
    record::{LogRecord, RecordBuilder},
    timestamp::TimestampFormat,
};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs after a Fatal record has been delivered
///
/// Without one the logger flushes every appender and exits the process
/// with status 1.
pub type FatalAction = Arc<dyn Fn(&LogRecord) + Send + Sync>;

/// Mutable configuration, guarded as one cell
struct DispatchState {
    level: LogLevel,
    fields: Fields,
    appenders: Vec<Arc<dyn Appender>>,
}

struct Inner {
    state: RwLock<DispatchState>,
    hooks: HookChain,
    extractor: Option<ContextExtractor>,
    error_handler: Option<ErrorHandler>,
    add_caller: bool,
    timestamp_format: TimestampFormat,
    on_fatal: Option<FatalAction>,
    metrics: Arc<LoggerMetrics>,
    /// Shared with child loggers
    closed: Arc<AtomicBool>,
}

/// Structured logger with synchronous delivery
///
/// Cloning is cheap and yields a handle to the same logger.
///
/// # Example
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .field("service", "billing")
///     .build();
///
/// logger.info_with("invoice sent", fields! { "invoice_id" => 1042 });
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// Logger at `Info` with no appenders
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn level(&self) -> LogLevel {
        self.inner.state.read().level
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.state.write().level = level;
    }

    /// Whether a record at `level` would pass the level gate
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        should_emit(self.inner.state.read().level, level)
    }

    pub fn add_appender<A: Appender + 'static>(&self, appender: A) {
        self.add_shared_appender(Arc::new(appender));
    }

    pub fn add_shared_appender(&self, appender: Arc<dyn Appender>) {
        self.inner.state.write().appenders.push(appender);
    }

    pub fn appender_count(&self) -> usize {
        self.inner.state.read().appenders.len()
    }

    /// Default fields attached to every record of this logger
    pub fn fields(&self) -> Fields {
        self.inner.state.read().fields.clone()
    }

    /// Child logger carrying additional default fields
    ///
    /// The child shares hooks, callbacks, metrics and the appender handles it
    /// starts with; its level and appender list are its own afterwards.
    #[must_use]
    pub fn with_fields(&self, fields: Fields) -> Logger {
        let state = self.inner.state.read();
        let inner = Inner {
            state: RwLock::new(DispatchState {
                level: state.level,
                fields: state.fields.clone().merged(fields),
                appenders: state.appenders.clone(),
            }),
            hooks: self.inner.hooks.clone(),
            extractor: self.inner.extractor.clone(),
            error_handler: self.inner.error_handler.clone(),
            add_caller: self.inner.add_caller,
            timestamp_format: self.inner.timestamp_format.clone(),
            on_fatal: self.inner.on_fatal.clone(),
            metrics: Arc::clone(&self.inner.metrics),
            closed: Arc::clone(&self.inner.closed),
        };
        Logger {
            inner: Arc::new(inner),
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub(crate) fn metrics_handle(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>, fields: Fields) {
        self.log_at(None, level, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn log_ctx(
        &self,
        ctx: &RequestContext,
        level: LogLevel,
        message: impl Into<String>,
        fields: Fields,
    ) {
        self.log_at(Some(ctx), level, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_at(None, LogLevel::Debug, message, Fields::new(), Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log_at(None, LogLevel::Info, message, Fields::new(), Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_at(None, LogLevel::Warn, message, Fields::new(), Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log_at(None, LogLevel::Error, message, Fields::new(), Location::caller());
    }

    /// Deliver a Fatal record, then run the fatal action (process exit by default)
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log_at(None, LogLevel::Fatal, message, Fields::new(), Location::caller());
    }

    #[track_caller]
    pub fn debug_with(&self, message: impl Into<String>, fields: Fields) {
        self.log_at(None, LogLevel::Debug, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn info_with(&self, message: impl Into<String>, fields: Fields) {
        self.log_at(None, LogLevel::Info, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn_with(&self, message: impl Into<String>, fields: Fields) {
        self.log_at(None, LogLevel::Warn, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn error_with(&self, message: impl Into<String>, fields: Fields) {
        self.log_at(None, LogLevel::Error, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn fatal_with(&self, message: impl Into<String>, fields: Fields) {
        self.log_at(None, LogLevel::Fatal, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn debug_ctx(&self, ctx: &RequestContext, message: impl Into<String>, fields: Fields) {
        self.log_at(Some(ctx), LogLevel::Debug, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn info_ctx(&self, ctx: &RequestContext, message: impl Into<String>, fields: Fields) {
        self.log_at(Some(ctx), LogLevel::Info, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn_ctx(&self, ctx: &RequestContext, message: impl Into<String>, fields: Fields) {
        self.log_at(Some(ctx), LogLevel::Warn, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn error_ctx(&self, ctx: &RequestContext, message: impl Into<String>, fields: Fields) {
        self.log_at(Some(ctx), LogLevel::Error, message, fields, Location::caller());
    }

    #[track_caller]
    pub fn fatal_ctx(&self, ctx: &RequestContext, message: impl Into<String>, fields: Fields) {
        self.log_at(Some(ctx), LogLevel::Fatal, message, fields, Location::caller());
    }

    /// Announce an orderly shutdown at Info with a `reason` field
    #[track_caller]
    pub fn log_shutdown(&self, reason: impl Into<String>) {
        let fields = Fields::new().with_field("reason", reason.into());
        self.log_at(
            None,
            LogLevel::Info,
            "Application shutting down",
            fields,
            Location::caller(),
        );
    }

    fn log_at(
        &self,
        ctx: Option<&RequestContext>,
        level: LogLevel,
        message: impl Into<String>,
        fields: Fields,
        location: &'static Location<'static>,
    ) {
        if let Some(record) = self.prepare(ctx, level, message, fields, location) {
            self.deliver(&record);
        }
    }

    /// Level gate, field merge, record build and hook chain
    ///
    /// Returns `None` when the record is filtered, vetoed, or the logger is
    /// closed. Nothing is allocated for records below the configured level.
    pub(crate) fn prepare(
        &self,
        ctx: Option<&RequestContext>,
        level: LogLevel,
        message: impl Into<String>,
        call_fields: Fields,
        location: &'static Location<'static>,
    ) -> Option<LogRecord> {
        let mut fields = {
            let state = self.inner.state.read();
            if !should_emit(state.level, level) {
                return None;
            }
            state.fields.clone()
        };

        if self.is_closed() {
            self.inner.metrics.record_dropped();
            return None;
        }

        if let (Some(extract), Some(ctx)) = (&self.inner.extractor, ctx) {
            fields.merge(&extract(ctx));
        }
        fields.merge(&call_fields);

        let mut builder = RecordBuilder::new(level, message)
            .fields(fields)
            .context(ctx);
        if self.inner.add_caller {
            builder = builder.caller(location);
        }
        let mut record = builder.build(&self.inner.timestamp_format);

        if self.inner.hooks.apply(ctx, &mut record).is_err() {
            self.inner.metrics.record_hook_rejection();
            return None;
        }

        Some(record)
    }

    /// Fan out, and terminate afterwards if the record is Fatal
    pub(crate) fn deliver(&self, record: &LogRecord) {
        self.dispatch(record);
        if record.level == LogLevel::Fatal {
            self.run_fatal_action(record);
        }
    }

    /// Write `record` to every appender in registration order
    ///
    /// Each appender's error, or panic, is reported independently; later
    /// appenders still receive the record. If the logger is closed part way
    /// through, the remaining appenders are skipped and the record counts as
    /// dropped.
    pub(crate) fn dispatch(&self, record: &LogRecord) {
        let appenders = self.inner.state.read().appenders.clone();

        let mut failed = false;
        for appender in &appenders {
            // Closed appenders must not be written, even by a worker that
            // outlived its shutdown timeout
            if self.is_closed() {
                self.inner.metrics.record_dropped();
                return;
            }

            let result = panic::catch_unwind(AssertUnwindSafe(|| appender.append(record)))
                .unwrap_or_else(|payload| {
                    Err(LoggerError::appender_panicked(
                        appender.name(),
                        panic_message(payload.as_ref()),
                    ))
                });

            if let Err(e) = result {
                failed = true;
                self.report_error(&e);
            }
        }

        if !failed {
            self.inner.metrics.record_logged();
        }
    }

    pub(crate) fn report_error(&self, error: &LoggerError) {
        self.inner.metrics.record_write_error();
        if let Some(ref handler) = self.inner.error_handler {
            handler(error);
        }
    }

    fn run_fatal_action(&self, record: &LogRecord) {
        match self.inner.on_fatal {
            Some(ref action) => action(record),
            None => {
                if let Err(e) = self.flush_appenders() {
                    eprintln!("[LOGGER ERROR] Failed to flush before fatal exit: {}", e);
                }
                std::process::exit(1);
            }
        }
    }

    fn flush_appenders(&self) -> Result<()> {
        let appenders = self.inner.state.read().appenders.clone();
        let mut last_error = None;
        for appender in &appenders {
            if let Err(e) = appender.flush() {
                last_error = Some(e);
            }
        }
        last_error.map_or(Ok(()), Err)
    }

    /// Flush every appender; a no-op once the logger is closed
    pub fn flush(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.flush_appenders()
    }

    /// Flush and close every appender
    ///
    /// Idempotent: only the first call closes anything. Returns the last
    /// appender error, if any; every error is also reported to the handler.
    /// Records logged afterwards are dropped.
    pub fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let appenders = self.inner.state.read().appenders.clone();
        let mut last_error = None;
        for appender in &appenders {
            let result = appender.flush().and_then(|()| appender.close());
            if let Err(e) = result {
                self.report_error(&e);
                last_error = Some(e);
            }
        }
        last_error.map_or(Ok(()), Err)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        for appender in &self.state.get_mut().appenders {
            if let Err(e) = appender.flush() {
                eprintln!(
                    "[LOGGER ERROR] Failed to flush appender '{}' on drop: {}",
                    appender.name(),
                    e
                );
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing a [`Logger`]
///
/// # Example
/// ```
/// use rust_event_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Warn)
///     .appender(ConsoleAppender::new())
///     .add_caller(true)
///     .error_handler(|e: &LoggerError| eprintln!("log write failed: {}", e))
///     .build();
/// ```
pub struct LoggerBuilder {
    level: LogLevel,
    fields: Fields,
    appenders: Vec<Arc<dyn Appender>>,
    hooks: HookChain,
    extractor: Option<ContextExtractor>,
    error_handler: Option<ErrorHandler>,
    add_caller: bool,
    timestamp_format: TimestampFormat,
    on_fatal: Option<FatalAction>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            fields: Fields::new(),
            appenders: Vec::new(),
            hooks: HookChain::new(),
            extractor: None,
            error_handler: None,
            add_caller: false,
            timestamp_format: TimestampFormat::default(),
            on_fatal: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Add a default field
    #[must_use = "builder methods return a new value"]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields.merge(&fields);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Arc::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_appender(mut self, appender: Arc<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Append a hook to the chain; hooks run in the order they are added
    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&RequestContext) -> Fields + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Record the `file:line` of each log call
    #[must_use = "builder methods return a new value"]
    pub fn add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Replace the process exit performed after a Fatal record
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal<F>(mut self, action: F) -> Self
    where
        F: Fn(&LogRecord) + Send + Sync + 'static,
    {
        self.on_fatal = Some(Arc::new(action));
        self
    }

    pub fn build(self) -> Logger {
        let inner = Inner {
            state: RwLock::new(DispatchState {
                level: self.level,
                fields: self.fields,
                appenders: self.appenders,
            }),
            hooks: self.hooks,
            extractor: self.extractor,
            error_handler: self.error_handler,
            add_caller: self.add_caller,
            timestamp_format: self.timestamp_format,
            on_fatal: self.on_fatal,
            metrics: Arc::new(LoggerMetrics::new()),
            closed: Arc::new(AtomicBool::new(false)),
        };
        Logger {
            inner: Arc::new(inner),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
