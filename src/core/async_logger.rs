//! Asynchronous dispatcher
//!
//! Records are built, and run through the hook chain, on the caller's thread
//! exactly as in [`Logger`]. Only the fan-out is deferred: records go into a
//! bounded queue drained by a fixed pool of worker threads.
//!
//! The enqueue never blocks. When the queue is full the record is dropped and
//! counted. Fatal records skip the queue and are delivered synchronously.

use super::{
    appender::Appender,
    context::RequestContext,
    error::Result,
    fields::Fields,
    hooks::OverflowCallback,
    log_level::LogLevel,
    logger::{panic_message, Logger},
    metrics::LoggerMetrics,
    record::LogRecord,
    sampling::{LogSampler, SamplingConfig},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default queue capacity
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Default number of worker threads
pub const DEFAULT_WORKERS: usize = 2;

/// Default time `close` waits for workers to drain the queue
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Logger whose destination writes happen on background workers
///
/// # Example
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// let base = Logger::builder().appender(ConsoleAppender::new()).build();
/// let logger = AsyncLogger::builder(base)
///     .buffer_size(4096)
///     .workers(4)
///     .build();
///
/// logger.info_with("request served", fields! { "status" => 200 });
/// logger.close().unwrap();
/// ```
pub struct AsyncLogger {
    base: Logger,
    sender: RwLock<Option<Sender<LogRecord>>>,
    /// Kept for queue inspection and for discarding records on abandonment
    receiver: Receiver<LogRecord>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Tells workers to stop picking up records
    stop: Arc<AtomicBool>,
    closed: AtomicBool,
    capacity: usize,
    worker_count: usize,
    shutdown_timeout: Duration,
    sampler: Option<LogSampler>,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
}

impl AsyncLogger {
    /// Wrap `base` with the default queue size, worker count and timeout
    pub fn new(base: Logger) -> Self {
        AsyncLoggerBuilder::new(base).build()
    }

    pub fn builder(base: Logger) -> AsyncLoggerBuilder {
        AsyncLoggerBuilder::new(base)
    }

    fn start(
        base: Logger,
        capacity: usize,
        worker_count: usize,
        shutdown_timeout: Duration,
        sampler: Option<LogSampler>,
        on_overflow: Option<OverflowCallback>,
    ) -> Self {
        let capacity = capacity.max(1);
        let worker_count = worker_count.max(1);
        let (sender, receiver) = bounded(capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let base = base.clone();
            let receiver = receiver.clone();
            let stop = Arc::clone(&stop);
            let spawned = thread::Builder::new()
                .name(format!("event-logger-worker-{}", id))
                .spawn(move || Self::run_worker(&base, &receiver, &stop));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => eprintln!("[LOGGER ERROR] Failed to spawn worker {}: {}", id, e),
            }
        }

        let metrics = base.metrics_handle();
        Self {
            base,
            sender: RwLock::new(Some(sender)),
            receiver,
            worker_count: workers.len(),
            workers: Mutex::new(workers),
            stop,
            closed: AtomicBool::new(false),
            capacity,
            shutdown_timeout,
            sampler,
            on_overflow,
            metrics,
        }
    }

    /// Drain records until every sender is gone and the queue is empty
    fn run_worker(base: &Logger, receiver: &Receiver<LogRecord>, stop: &AtomicBool) {
        for record in receiver.iter() {
            if stop.load(Ordering::Acquire) {
                break;
            }
            base.dispatch(&record);
        }
    }

    /// The wrapped synchronous logger
    pub fn base(&self) -> &Logger {
        &self.base
    }

    pub fn set_level(&self, level: LogLevel) {
        self.base.set_level(level);
    }

    pub fn level(&self) -> LogLevel {
        self.base.level()
    }

    pub fn add_appender<A: Appender + 'static>(&self, appender: A) {
        self.base.add_appender(appender);
    }

    pub fn add_shared_appender(&self, appender: Arc<dyn Appender>) {
        self.base.add_shared_appender(appender);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Records discarded because the queue was full or the logger closed
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn queue_len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_full(&self) -> bool {
        self.receiver.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of running worker threads
    pub fn workers(&self) -> usize {
        self.worker_count
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    pub fn sampler(&self) -> Option<&LogSampler> {
        self.sampler.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
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

    /// Delivered synchronously, bypassing the queue, then the fatal action runs
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

    fn log_at(
        &self,
        ctx: Option<&RequestContext>,
        level: LogLevel,
        message: impl Into<String>,
        fields: Fields,
        location: &'static Location<'static>,
    ) {
        if !self.base.enabled(level) {
            return;
        }

        let message = message.into();
        if let Some(ref sampler) = self.sampler {
            if !sampler.allow_level(level, &message) {
                self.metrics.record_sampled_out();
                return;
            }
        }

        let Some(record) = self.base.prepare(ctx, level, message, fields, location) else {
            return;
        };

        if level == LogLevel::Fatal {
            self.base.deliver(&record);
            return;
        }

        self.enqueue(record);
    }

    fn enqueue(&self, record: LogRecord) {
        let sender = self.sender.read();
        let Some(ref tx) = *sender else {
            self.metrics.record_dropped();
            return;
        };

        match tx.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.metrics.record_queue_full();
                let dropped = self.metrics.record_dropped() + 1;
                if dropped == 1 || dropped % 1000 == 0 {
                    eprintln!(
                        "[LOGGER WARNING] Queue full, {} logs dropped. \
                         Consider increasing buffer size or worker count.",
                        dropped
                    );
                }
                if let Some(ref callback) = self.on_overflow {
                    callback(dropped);
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
            }
        }
    }

    /// Wait until every record enqueued so far has been picked up by a worker
    ///
    /// This does not wait for the destination writes themselves; appenders
    /// are flushed afterwards. Returns immediately once closed. Without any
    /// running worker there is nothing to wait for, so only the appenders are
    /// flushed.
    pub fn flush(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if self.worker_count == 0 {
            return self.base.flush();
        }
        while !self.receiver.is_empty() && !self.stop.load(Ordering::Acquire) {
            thread::sleep(POLL_INTERVAL);
        }
        self.base.flush()
    }

    /// Stop accepting records, drain the queue, then close every appender
    ///
    /// Workers get `shutdown_timeout` to drain. Past that they are abandoned
    /// and whatever is still queued is discarded and counted as dropped.
    /// Idempotent: later calls return `Ok(())` without doing anything.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        drop(self.sender.write().take());

        let handles = std::mem::take(&mut *self.workers.lock());
        let deadline = Instant::now() + self.shutdown_timeout;
        let mut abandoned = 0usize;

        for handle in handles {
            loop {
                if handle.is_finished() {
                    if let Err(payload) = handle.join() {
                        eprintln!(
                            "[LOGGER ERROR] Worker thread panicked during shutdown: {}",
                            panic_message(payload.as_ref())
                        );
                    }
                    break;
                }
                if Instant::now() >= deadline {
                    abandoned += 1;
                    break;
                }
                thread::sleep(POLL_INTERVAL * 10);
            }
        }

        if abandoned > 0 || self.worker_count == 0 {
            self.stop.store(true, Ordering::Release);
            let lost = self.receiver.try_iter().count();
            for _ in 0..lost {
                self.metrics.record_dropped();
            }
            eprintln!(
                "[LOGGER WARNING] {} of {} worker(s) did not finish within {:?}; {} queued logs lost.",
                abandoned, self.worker_count, self.shutdown_timeout, lost
            );
        }

        self.base.close()
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close logger on drop: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for [`AsyncLogger`]
///
/// # Example
///
/// ```
/// use rust_event_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = AsyncLogger::builder(Logger::new())
///     .buffer_size(100)
///     .workers(1)
///     .shutdown_timeout(Duration::from_secs(1))
///     .sampling(SamplingConfig::new(10, 10))
///     .on_overflow(Arc::new(|dropped| eprintln!("{} logs dropped", dropped)))
///     .build();
/// ```
pub struct AsyncLoggerBuilder {
    base: Logger,
    buffer_size: usize,
    workers: usize,
    shutdown_timeout: Duration,
    sampling: Option<SamplingConfig>,
    on_overflow: Option<OverflowCallback>,
}

impl AsyncLoggerBuilder {
    pub fn new(base: Logger) -> Self {
        Self {
            base,
            buffer_size: DEFAULT_BUFFER_SIZE,
            workers: DEFAULT_WORKERS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            sampling: None,
            on_overflow: None,
        }
    }

    /// Queue capacity; 0 is treated as 1
    #[must_use = "builder methods return a new value"]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Worker thread count; 0 is treated as 1
    #[must_use = "builder methods return a new value"]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sample non-exempt levels on the caller's thread before enqueueing
    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, config: SamplingConfig) -> Self {
        self.sampling = Some(config);
        self
    }

    /// Called with the running drop total each time a record is dropped on a full queue
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    pub fn build(self) -> AsyncLogger {
        AsyncLogger::start(
            self.base,
            self.buffer_size,
            self.workers,
            self.shutdown_timeout,
            self.sampling.map(LogSampler::new),
            self.on_overflow,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;
    use std::sync::atomic::AtomicU64;

    struct MemoryAppender {
        records: Arc<Mutex<Vec<LogRecord>>>,
        closes: Arc<AtomicU64>,
    }

    impl MemoryAppender {
        fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
                closes: Arc::new(AtomicU64::new(0)),
            }
        }
    }

    impl Appender for MemoryAppender {
        fn append(&self, record: &LogRecord) -> Result<()> {
            self.records.lock().push(record.clone());
            Ok(())
        }

        fn close(&self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    /// Blocks every write until the release sender is dropped
    struct GateAppender {
        entered: Sender<()>,
        release: Receiver<()>,
        records: Arc<Mutex<Vec<String>>>,
    }

    impl Appender for GateAppender {
        fn append(&self, record: &LogRecord) -> Result<()> {
            let _ = self.entered.try_send(());
            let _ = self.release.recv();
            self.records.lock().push(record.message.clone());
            Ok(())
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "gate"
        }
    }

    fn gate() -> (GateAppender, Receiver<()>, Sender<()>, Arc<Mutex<Vec<String>>>) {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded::<()>(0);
        let records = Arc::new(Mutex::new(Vec::new()));
        let appender = GateAppender {
            entered: entered_tx,
            release: release_rx,
            records: Arc::clone(&records),
        };
        (appender, entered_rx, release_tx, records)
    }

    #[test]
    fn test_delivers_all_records_on_close() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let logger = AsyncLogger::builder(Logger::builder().appender(sink).build())
            .buffer_size(64)
            .workers(3)
            .build();

        for i in 0..50 {
            logger.info(format!("message {}", i));
        }
        logger.close().unwrap();

        assert_eq!(records.lock().len(), 50);
        assert_eq!(logger.dropped_count(), 0);
        assert_eq!(logger.metrics().total_logged(), 50);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        const CAPACITY: usize = 4;
        let (appender, entered, release, records) = gate();
        let overflow_totals = Arc::new(Mutex::new(Vec::new()));
        let totals = Arc::clone(&overflow_totals);

        let logger = AsyncLogger::builder(Logger::builder().appender(appender).build())
            .buffer_size(CAPACITY)
            .workers(1)
            .on_overflow(Arc::new(move |n| totals.lock().push(n)))
            .build();

        logger.info("in flight");
        entered.recv().unwrap();

        let started = Instant::now();
        for i in 0..=CAPACITY {
            logger.info(format!("queued {}", i));
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(logger.is_full());
        assert_eq!(logger.dropped_count(), 1);
        assert_eq!(logger.metrics().queue_full_events(), 1);
        assert_eq!(*overflow_totals.lock(), vec![1]);

        drop(release);
        logger.close().unwrap();

        let expected: Vec<String> = std::iter::once("in flight".to_string())
            .chain((0..CAPACITY).map(|i| format!("queued {}", i)))
            .collect();
        assert_eq!(*records.lock(), expected);
    }

    #[test]
    fn test_close_is_idempotent() {
        let sink = MemoryAppender::new();
        let closes = Arc::clone(&sink.closes);
        let logger = AsyncLogger::new(Logger::builder().appender(sink).build());

        assert!(logger.close().is_ok());
        assert!(logger.close().is_ok());
        assert!(logger.is_closed());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_records_after_close_are_dropped() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let logger = AsyncLogger::new(Logger::builder().appender(sink).build());

        logger.close().unwrap();
        logger.info("too late");

        assert!(records.lock().is_empty());
        assert_eq!(logger.dropped_count(), 1);
    }

    #[test]
    fn test_abandoned_worker_never_writes_to_closed_appenders() {
        let (appender, entered, release, gated) = gate();
        let tail = MemoryAppender::new();
        let tail_records = Arc::clone(&tail.records);
        let tail_closes = Arc::clone(&tail.closes);
        let base = Logger::builder().appender(appender).appender(tail).build();
        let logger = AsyncLogger::builder(base)
            .buffer_size(16)
            .workers(1)
            .shutdown_timeout(Duration::from_millis(100))
            .build();

        logger.info("stuck");
        entered.recv().unwrap();
        for i in 0..5 {
            logger.info(format!("never written {}", i));
        }

        let started = Instant::now();
        assert!(logger.close().is_ok());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(tail_closes.load(Ordering::SeqCst), 1);
        assert_eq!(logger.dropped_count(), 5);

        // The worker resumes inside the first appender, after both were closed
        drop(release);
        thread::sleep(Duration::from_millis(200));

        assert_eq!(*gated.lock(), vec!["stuck".to_string()]);
        assert!(tail_records.lock().is_empty());
        assert_eq!(logger.dropped_count(), 6);
        assert_eq!(logger.metrics().total_logged(), 0);
        assert!(logger.close().is_ok());
    }

    /// Same shape as `start` when every worker failed to spawn
    fn without_workers(base: Logger, capacity: usize) -> AsyncLogger {
        let (sender, receiver) = bounded(capacity);
        let metrics = base.metrics_handle();
        AsyncLogger {
            base,
            sender: RwLock::new(Some(sender)),
            receiver,
            workers: Mutex::new(Vec::new()),
            stop: Arc::new(AtomicBool::new(false)),
            closed: AtomicBool::new(false),
            capacity,
            worker_count: 0,
            shutdown_timeout: Duration::from_millis(100),
            sampler: None,
            on_overflow: None,
            metrics,
        }
    }

    #[test]
    fn test_flush_returns_without_workers() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let logger = without_workers(Logger::builder().appender(sink).build(), 8);

        logger.info("stranded");
        let started = Instant::now();
        assert!(logger.flush().is_ok());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(logger.queue_len(), 1);

        assert!(logger.close().is_ok());
        assert!(records.lock().is_empty());
        assert_eq!(logger.dropped_count(), 1);
    }

    #[test]
    fn test_fatal_bypasses_full_queue() {
        let (appender, entered, release, records) = gate();
        let fatal_seen = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&fatal_seen);
        let sink = MemoryAppender::new();
        let sink_records = Arc::clone(&sink.records);

        let base = Logger::builder()
            .appender(sink)
            .on_fatal(move |_: &LogRecord| seen.store(true, Ordering::SeqCst))
            .build();
        let logger = AsyncLogger::builder(base.clone())
            .buffer_size(1)
            .workers(1)
            .build();
        logger.add_appender(appender);

        logger.info("occupies worker");
        entered.recv().unwrap();
        logger.info("fills queue");
        logger.info("dropped");

        drop(release);
        logger.fatal("going down");

        assert!(fatal_seen.load(Ordering::SeqCst));
        assert!(sink_records.lock().iter().any(|r| r.message == "going down"));
        assert_eq!(logger.dropped_count(), 1);

        logger.close().unwrap();
        assert!(records.lock().contains(&"going down".to_string()));
    }

    #[test]
    fn test_hooks_run_before_enqueue() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let base = Logger::builder()
            .appender(sink)
            .hook(|_: Option<&RequestContext>, r: &mut LogRecord| -> Result<()> {
                if r.level == LogLevel::Debug {
                    return Err(LoggerError::hook_rejected("no debug"));
                }
                r.fields.insert("worker_thread", false);
                Ok(())
            })
            .level(LogLevel::Debug)
            .build();
        let logger = AsyncLogger::new(base);

        logger.debug("vetoed");
        logger.info("kept");
        logger.close().unwrap();

        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
        assert_eq!(logger.metrics().hook_rejections(), 1);
    }

    #[test]
    fn test_sampling_on_caller_thread() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let logger = AsyncLogger::builder(Logger::builder().appender(sink).build())
            .sampling(SamplingConfig::new(2, 0).with_interval(Duration::from_secs(60)))
            .build();

        for _ in 0..10 {
            logger.info("repeated");
            logger.error("repeated");
        }
        logger.close().unwrap();

        let records = records.lock();
        let infos = records.iter().filter(|r| r.level == LogLevel::Info).count();
        let errors = records.iter().filter(|r| r.level == LogLevel::Error).count();
        assert_eq!(infos, 2);
        assert_eq!(errors, 10);
        assert_eq!(logger.metrics().sampled_out(), 8);
    }

    #[test]
    fn test_zero_sizes_are_clamped() {
        let logger = AsyncLogger::builder(Logger::new())
            .buffer_size(0)
            .workers(0)
            .build();

        assert_eq!(logger.capacity(), 1);
        assert_eq!(logger.workers(), 1);
        assert_eq!(logger.shutdown_timeout(), DEFAULT_SHUTDOWN_TIMEOUT);
    }

    #[test]
    fn test_flush_waits_for_queue() {
        let sink = MemoryAppender::new();
        let records = Arc::clone(&sink.records);
        let logger = AsyncLogger::new(Logger::builder().appender(sink).build());

        for i in 0..100 {
            logger.info(format!("m{}", i));
        }
        logger.flush().unwrap();

        assert_eq!(logger.queue_len(), 0);
        logger.close().unwrap();
        assert_eq!(records.lock().len(), 100);
    }
}
