//! Integration tests for the event logger
//!
//! These tests verify:
//! - Log injection prevention
//! - Synchronous fan-out and error isolation
//! - Async delivery through the worker pool
//! - Size-based rotation driven by the logger
//! - Request context extraction and hooks
//! - Sampling
//! - Configuration-built loggers

use parking_lot::Mutex;
use rust_event_logger::appenders::{RotatingFileAppender, RotationPolicy};
use rust_event_logger::core::hooks::redact_fields;
use rust_event_logger::core::Formatter;
use rust_event_logger::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Captures records in memory
#[derive(Default)]
struct MemoryAppender {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryAppender {
    fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }
}

impl Appender for MemoryAppender {
    fn append(&self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

struct FailingAppender;

impl Appender for FailingAppender {
    fn append(&self, _record: &LogRecord) -> Result<()> {
        Err(LoggerError::writer("disk unplugged"))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[derive(Debug, Clone)]
struct RequestId(String);

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let appender = RotatingFileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder().appender(appender).build();

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    logger.info(malicious_message);
    logger.close().expect("Failed to close");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    assert!(!content.contains("\nERROR [2024-10-17] Fake error injected\n"));

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
}

#[test]
fn test_failing_appender_does_not_stop_fan_out() {
    let first = Arc::new(MemoryAppender::default());
    let last = Arc::new(MemoryAppender::default());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);

    let logger = Logger::builder()
        .shared_appender(first.clone())
        .appender(FailingAppender)
        .shared_appender(last.clone())
        .error_handler(move |e: &LoggerError| sink.lock().push(e.to_string()))
        .build();

    logger.info("one");
    logger.info("two");

    assert_eq!(first.messages(), vec!["one", "two"]);
    assert_eq!(last.messages(), vec!["one", "two"]);
    assert_eq!(errors.lock().len(), 2);
    assert_eq!(logger.metrics().write_errors(), 2);
    assert_eq!(logger.metrics().total_logged(), 0);
}

#[test]
fn test_rotation_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotate.log");

    let appender = Arc::new(
        RotatingFileAppender::with_policy(&log_file, RotationPolicy::new(512, 2))
            .expect("Failed to create appender"),
    );
    let logger = Logger::builder()
        .shared_appender(appender.clone())
        .timestamp_format(TimestampFormat::Rfc3339)
        .build();

    for i in 0..100 {
        logger.info_with("request served", fields! { "seq" => i });
    }
    logger.close().expect("Failed to close");

    assert!(appender.backup_path(1).exists());
    assert!(appender.backup_path(2).exists());
    assert!(!appender.backup_path(3).exists());

    for path in [log_file.clone(), appender.backup_path(1), appender.backup_path(2)] {
        let len = fs::metadata(&path).unwrap().len();
        assert!(len <= 512, "{} is {} bytes", path.display(), len);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().all(|l| l.contains("request served seq=")));
    }

    let active = fs::read_to_string(&log_file).unwrap();
    assert!(active.lines().last().unwrap().ends_with("seq=99"));
}

#[test]
fn test_async_logging_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("async_test.log");

    let base = Logger::builder()
        .level(LogLevel::Debug)
        .appender(RotatingFileAppender::new(&log_file).expect("Failed to create appender"))
        .build();
    let logger = AsyncLogger::builder(base)
        .buffer_size(100)
        .workers(1)
        .build();

    for i in 0..50 {
        logger.debug(format!("Message {}", i));
    }
    logger.close().expect("Failed to close");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(logger.dropped_count(), 0);
    assert_eq!(lines.len(), 50);
    assert!(lines[0].contains("Message 0"));
    assert!(lines[49].contains("Message 49"));
}

#[test]
fn test_async_logs_after_close_are_dropped() {
    let memory = Arc::new(MemoryAppender::default());
    let base = Logger::builder().shared_appender(memory.clone()).build();
    let logger = AsyncLogger::new(base);

    logger.info("before");
    logger.close().unwrap();
    logger.info("after");
    logger.close().unwrap();

    assert_eq!(memory.messages(), vec!["before"]);
    assert_eq!(logger.dropped_count(), 1);
}

#[test]
fn test_context_extraction_and_precedence() {
    let memory = Arc::new(MemoryAppender::default());
    let logger = Logger::builder()
        .field("service", "checkout")
        .field("tier", "default")
        .context_extractor(|ctx: &RequestContext| {
            let mut fields = Fields::new();
            if let Some(id) = ctx.value::<RequestId>() {
                fields.insert("request_id", id.0.clone());
            }
            fields.insert("tier", "context");
            fields
        })
        .shared_appender(memory.clone())
        .build();

    let ctx = RequestContext::new().with_value(RequestId("req-7".to_string()));
    logger.info_ctx(&ctx, "charged", fields! { "amount" => 1250 });
    logger.info_ctx(&ctx, "override", fields! { "tier" => "call" });
    logger.info("no context");

    let records = memory.records.lock();
    let first = &records[0];
    assert_eq!(first.field("service").and_then(|v| v.as_str()), Some("checkout"));
    assert_eq!(first.field("request_id").and_then(|v| v.as_str()), Some("req-7"));
    assert_eq!(first.field("tier").and_then(|v| v.as_str()), Some("context"));
    assert_eq!(first.field("amount"), Some(&FieldValue::Int(1250)));
    assert!(first.context.is_some());

    assert_eq!(records[1].field("tier").and_then(|v| v.as_str()), Some("call"));

    assert_eq!(records[2].field("tier").and_then(|v| v.as_str()), Some("default"));
    assert!(records[2].field("request_id").is_none());
}

#[test]
fn test_redaction_and_veto_hooks() {
    let memory = Arc::new(MemoryAppender::default());
    let logger = Logger::builder()
        .hook(redact_fields(["password"]))
        .hook(|_ctx: Option<&RequestContext>, record: &mut LogRecord| -> Result<()> {
            if record.message.contains("healthcheck") {
                Err(LoggerError::hook_rejected("noise"))
            } else {
                Ok(())
            }
        })
        .shared_appender(memory.clone())
        .build();

    logger.info_with("login", fields! { "user" => "ana", "password" => "hunter2" });
    logger.info("healthcheck ok");

    let records = memory.records.lock();
    assert_eq!(records.len(), 1);
    assert_ne!(records[0].field("password").and_then(|v| v.as_str()), Some("hunter2"));
    assert_eq!(records[0].field("user").and_then(|v| v.as_str()), Some("ana"));
    assert_eq!(logger.metrics().hook_rejections(), 1);
}

#[test]
fn test_json_output_with_caller() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("events.json");

    let appender = RotatingFileAppender::new(&log_file)
        .expect("Failed to create appender")
        .with_formatter(Formatter::json());
    let logger = Logger::builder()
        .add_caller(true)
        .field("service", "api")
        .appender(appender)
        .build();

    logger.warn_with("slow query", fields! { "ms" => 812, "cached" => false });
    logger.close().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(value["level"], "WARN");
    assert_eq!(value["message"], "slow query");
    assert_eq!(value["fields"]["ms"], 812);
    assert_eq!(value["fields"]["cached"], false);
    assert_eq!(value["fields"]["service"], "api");
    assert!(value["caller"]
        .as_str()
        .unwrap()
        .starts_with("integration_tests.rs:"));
    assert!(value["time"].is_string());
}

#[test]
fn test_sampled_logger_end_to_end() {
    let memory = Arc::new(MemoryAppender::default());
    let logger = Logger::builder().shared_appender(memory.clone()).build();
    let sampled = SampledLogger::new(
        logger.clone(),
        SamplingConfig::new(2, 3).with_interval(Duration::from_secs(60)),
    );

    for _ in 0..9 {
        sampled.info("cache miss");
    }
    for _ in 0..3 {
        sampled.error("upstream failed");
    }

    let messages = memory.messages();
    assert_eq!(messages.iter().filter(|m| *m == "cache miss").count(), 4);
    assert_eq!(messages.iter().filter(|m| *m == "upstream failed").count(), 3);
    assert_eq!(logger.metrics().sampled_out(), 5);
}

#[test]
fn test_child_logger_shares_appenders() {
    let memory = Arc::new(MemoryAppender::default());
    let parent = Logger::builder()
        .field("service", "auth")
        .shared_appender(memory.clone())
        .build();
    let child = parent.with_fields(fields! { "component" => "tokens" });

    child.info("issued");
    parent.info("started");

    let records = memory.records.lock();
    assert_eq!(records[0].field("component").and_then(|v| v.as_str()), Some("tokens"));
    assert_eq!(records[0].field("service").and_then(|v| v.as_str()), Some("auth"));
    assert!(records[1].field("component").is_none());
}

#[test]
fn test_logger_from_config_writes_json_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let json = serde_json::json!({
        "logger": {
            "level": "debug",
            "format": "json",
            "time_format": "unix_millis",
            "file": { "enabled": true, "path": log_file, "max_size_mb": 1, "max_backups": 2 }
        }
    })
    .to_string();
    let config = Config::from_json_str(&json).unwrap();
    let logger = Logger::from_config(&config).unwrap();

    logger.debug("configured");
    logger.close().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(value["level"], "DEBUG");
    assert!(value["time"].as_str().unwrap().chars().all(|c| c.is_ascii_digit()));
    assert!(value["caller"].is_string());
}

#[test]
fn test_flush_and_close_after_close() {
    let logger = Logger::builder()
        .appender(MemoryAppender::default())
        .build();

    logger.close().unwrap();
    assert!(logger.is_closed());
    assert!(logger.flush().is_ok());
    assert!(logger.close().is_ok());

    logger.info("ignored");
    assert_eq!(logger.metrics().dropped_count(), 1);
}
