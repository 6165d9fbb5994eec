//! Rate sampling for repetitive log statements
//!
//! Each key (the message text, unless the caller picks one) gets a window of
//! `interval`. Inside a window the first `initial` occurrences pass, then every
//! `thereafter`-th one. A key observed after its window has ended starts a new
//! window. Error and Fatal are exempt by default.
//!
//! # Example
//!
//! ```
//! use rust_event_logger::prelude::*;
//! use std::time::Duration;
//!
//! let sampler = LogSampler::new(
//!     SamplingConfig::new(2, 3).with_interval(Duration::from_secs(1)),
//! );
//!
//! let allowed: Vec<bool> = (0..9).map(|_| sampler.allow("cache miss")).collect();
//! assert_eq!(
//!     allowed,
//!     [true, true, false, false, true, false, false, true, false]
//! );
//! ```

use super::fields::Fields;
use super::log_level::LogLevel;
use super::logger::Logger;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default length of a sampling window
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(1);

/// Number of tracked keys above which expired windows are pruned
const PRUNE_THRESHOLD: usize = 4096;

/// Configuration for log sampling
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Occurrences per window that always pass
    pub initial: u64,

    /// After `initial`, pass every `thereafter`-th occurrence; 0 passes none
    pub thereafter: u64,

    /// Window length
    pub interval: Duration,

    /// Levels that bypass sampling entirely
    pub exempt_levels: Vec<LogLevel>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            initial: 100,
            thereafter: 100,
            interval: DEFAULT_SAMPLING_INTERVAL,
            exempt_levels: vec![LogLevel::Error, LogLevel::Fatal],
        }
    }
}

impl SamplingConfig {
    pub fn new(initial: u64, thereafter: u64) -> Self {
        Self {
            initial,
            thereafter,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_exempt_levels(mut self, levels: Vec<LogLevel>) -> Self {
        self.exempt_levels = levels;
        self
    }

    pub fn is_exempt(&self, level: LogLevel) -> bool {
        self.exempt_levels.contains(&level)
    }
}

/// Metrics for sampling observability
///
/// # Example
///
/// ```
/// use rust_event_logger::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.allowed_count(), 0);
/// assert_eq!(metrics.suppressed_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    allowed_count: AtomicU64,
    suppressed_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            allowed_count: AtomicU64::new(0),
            suppressed_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn allowed_count(&self) -> u64 {
        self.allowed_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.allowed_count() + self.suppressed_count()
    }

    #[inline]
    pub(crate) fn record_allowed(&self) {
        self.allowed_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_suppressed(&self) {
        self.suppressed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of sampled decisions that passed
    ///
    /// Returns 1.0 if nothing has been sampled yet.
    pub fn effective_sample_rate(&self) -> f64 {
        let total = self.total_count() as f64;
        if total == 0.0 {
            1.0
        } else {
            self.allowed_count() as f64 / total
        }
    }

    pub fn reset(&self) {
        self.allowed_count.store(0, Ordering::Relaxed);
        self.suppressed_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SamplerMetrics {
    fn clone(&self) -> Self {
        Self {
            allowed_count: AtomicU64::new(self.allowed_count()),
            suppressed_count: AtomicU64::new(self.suppressed_count()),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u64,
    ends_at: Instant,
}

#[derive(Debug, Default)]
struct Windows {
    by_key: HashMap<String, Window>,
    /// Earliest time the next prune may run
    next_prune: Option<Instant>,
}

impl Windows {
    /// Drop expired windows once the map is large, at most once per interval
    fn maybe_prune(&mut self, key: &str, now: Instant, interval: Duration) {
        if self.by_key.len() < PRUNE_THRESHOLD || self.by_key.contains_key(key) {
            return;
        }
        if self.next_prune.is_some_and(|at| now < at) {
            return;
        }
        self.by_key.retain(|_, w| now <= w.ends_at);
        self.next_prune = Some(now + interval);
    }
}

/// Per-key admission counter
///
/// # Thread Safety
///
/// All keys share one mutex; a decision is a map lookup and an increment.
/// Past 4096 tracked keys, expired windows are swept at most once per
/// interval.
#[derive(Debug)]
pub struct LogSampler {
    config: SamplingConfig,
    windows: Mutex<Windows>,
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(Windows::default()),
            metrics: SamplerMetrics::new(),
        }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    /// Decide whether the next occurrence of `key` passes
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// [`LogSampler::allow`] with an explicit clock reading
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let allowed = {
            let mut windows = self.windows.lock();
            windows.maybe_prune(key, now, self.config.interval);

            match windows.by_key.get_mut(key) {
                Some(window) if now <= window.ends_at => {
                    window.count += 1;
                    self.admits(window.count)
                }
                Some(window) => {
                    window.count = 1;
                    window.ends_at = now + self.config.interval;
                    true
                }
                None => {
                    windows.by_key.insert(
                        key.to_string(),
                        Window {
                            count: 1,
                            ends_at: now + self.config.interval,
                        },
                    );
                    true
                }
            }
        };

        if allowed {
            self.metrics.record_allowed();
        } else {
            self.metrics.record_suppressed();
        }
        allowed
    }

    /// Level-aware decision: exempt levels always pass without touching state
    pub fn allow_level(&self, level: LogLevel, key: &str) -> bool {
        self.config.is_exempt(level) || self.allow(key)
    }

    fn admits(&self, count: u64) -> bool {
        if count <= self.config.initial {
            return true;
        }
        self.config.thereafter > 0 && (count - self.config.initial) % self.config.thereafter == 0
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().by_key.len()
    }

    /// Forget every window
    pub fn reset(&self) {
        let mut windows = self.windows.lock();
        windows.by_key.clear();
        windows.next_prune = None;
    }
}

/// Logger wrapper that samples Debug/Info/Warn statements by key
///
/// # Example
///
/// ```
/// use rust_event_logger::prelude::*;
///
/// let logger = Logger::builder().appender(ConsoleAppender::new()).build();
/// let sampled = SampledLogger::new(logger, SamplingConfig::new(10, 100));
///
/// for _ in 0..1000 {
///     sampled.info("polling upstream");
/// }
/// assert!(sampled.sampler().metrics().suppressed_count() > 0);
/// ```
#[derive(Clone)]
pub struct SampledLogger {
    logger: Logger,
    sampler: Arc<LogSampler>,
}

impl SampledLogger {
    pub fn new(logger: Logger, config: SamplingConfig) -> Self {
        Self::with_sampler(logger, Arc::new(LogSampler::new(config)))
    }

    pub fn with_sampler(logger: Logger, sampler: Arc<LogSampler>) -> Self {
        Self { logger, sampler }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn sampler(&self) -> &LogSampler {
        &self.sampler
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log_keyed(message, LogLevel::Debug, message, Fields::new());
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.log_keyed(message, LogLevel::Info, message, Fields::new());
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log_keyed(message, LogLevel::Warn, message, Fields::new());
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log_keyed(message, LogLevel::Error, message, Fields::new());
    }

    #[track_caller]
    pub fn fatal(&self, message: &str) {
        self.log_keyed(message, LogLevel::Fatal, message, Fields::new());
    }

    #[track_caller]
    pub fn debug_with(&self, message: &str, fields: Fields) {
        self.log_keyed(message, LogLevel::Debug, message, fields);
    }

    #[track_caller]
    pub fn info_with(&self, message: &str, fields: Fields) {
        self.log_keyed(message, LogLevel::Info, message, fields);
    }

    #[track_caller]
    pub fn warn_with(&self, message: &str, fields: Fields) {
        self.log_keyed(message, LogLevel::Warn, message, fields);
    }

    #[track_caller]
    pub fn error_with(&self, message: &str, fields: Fields) {
        self.log_keyed(message, LogLevel::Error, message, fields);
    }

    /// Log with an explicit sampling key instead of the message text
    #[track_caller]
    pub fn log_keyed(&self, key: &str, level: LogLevel, message: impl Into<String>, fields: Fields) {
        let location = Location::caller();
        if !self.logger.enabled(level) {
            return;
        }
        if !self.sampler.allow_level(level, key) {
            self.logger.metrics().record_sampled_out();
            return;
        }
        if let Some(record) = self.logger.prepare(None, level, message, fields, location) {
            self.logger.deliver(&record);
        }
    }
}
