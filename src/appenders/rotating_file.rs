//! Rotating file appender with size-based rotation
//!
//! On-disk layout for a base path `P`: `P` is the active file, `P.1` the most
//! recent backup and `P.N` the oldest. A write that would push the active file
//! past the size limit first cuts over to a fresh file, so one record is never
//! split across two files.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::formatter::Formatter;
use crate::core::record::LogRecord;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size limit and backup count of a rotating file
///
/// # Examples
///
/// ```
/// use rust_event_logger::appenders::RotationPolicy;
///
/// // Rotate at 50 MB, keep 7 backups
/// let policy = RotationPolicy::new(50 * 1024 * 1024, 7);
/// assert!(policy.is_enabled());
///
/// let policy = RotationPolicy::with_max_size_mb(10, 3);
/// assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
///
/// // Never rotate
/// assert!(!RotationPolicy::disabled().is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size limit of the active file; 0 disables rotation
    pub max_bytes: u64,
    /// Number of numbered backups kept; 0 discards the old file on rotation
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 100 * BYTES_PER_MB,
            max_backups: 3,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new(max_bytes: u64, max_backups: usize) -> Self {
        Self {
            max_bytes,
            max_backups,
        }
    }

    #[must_use]
    pub fn with_max_size_mb(max_size_mb: u64, max_backups: usize) -> Self {
        Self::new(max_size_mb.saturating_mul(BYTES_PER_MB), max_backups)
    }

    /// Plain append-only file
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_bytes > 0
    }

    /// `size + incoming > max`, except that an empty file never rotates
    fn should_rotate(&self, current_size: u64, incoming: u64) -> bool {
        self.is_enabled() && current_size > 0 && current_size.saturating_add(incoming) > self.max_bytes
    }
}

struct FileState {
    /// `None` after a failed rotation or after close
    file: Option<File>,
    /// Bytes written to the active file, seeded from its length on open
    size: u64,
    closed: bool,
}

/// File appender that rotates by size
///
/// Writes are unbuffered, so the tracked size always matches what the file
/// holds. A single mutex covers write and rotation; concurrent workers see
/// each record land whole in exactly one file.
///
/// # Examples
///
/// ```no_run
/// use rust_event_logger::appenders::{RotatingFileAppender, RotationPolicy};
/// use rust_event_logger::core::Formatter;
///
/// let appender = RotatingFileAppender::with_policy(
///     "/var/log/app.log",
///     RotationPolicy::with_max_size_mb(100, 5),
/// )
/// .unwrap()
/// .with_formatter(Formatter::json());
/// ```
pub struct RotatingFileAppender {
    base_path: PathBuf,
    policy: RotationPolicy,
    formatter: Formatter,
    state: Mutex<FileState>,
}

impl RotatingFileAppender {
    /// Create an appender with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create an appender with a custom policy
    ///
    /// Missing parent directories are created. An existing file is appended
    /// to and its length counts toward the size limit.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, size) = Self::open_active(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            formatter: Formatter::text(),
            state: Mutex::new(FileState {
                file: Some(file),
                size,
                closed: false,
            }),
        })
    }

    /// Set the line formatter (text without colours by default)
    #[must_use]
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    fn open_active(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok((file, size))
    }

    /// Write raw bytes as one unit, rotating first if they would not fit
    pub fn write_bytes(&self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::appender_closed(self.name()));
        }

        if state.file.is_none() {
            // a previous rotation failed midway
            let (file, size) = Self::open_active(&self.base_path)?;
            eprintln!(
                "[LOGGER WARNING] Reopened '{}' after failed rotation",
                self.base_path.display()
            );
            state.file = Some(file);
            state.size = size;
        }

        let incoming = data.len() as u64;
        if self.policy.should_rotate(state.size, incoming) {
            self.rotate(&mut state)?;
        }

        let file = state
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        file.write_all(data).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        state.size += incoming;
        Ok(())
    }

    fn rotate(&self, state: &mut FileState) -> Result<()> {
        if let Some(mut file) = state.file.take() {
            let _ = file.flush();
        }

        if self.policy.max_backups > 0 {
            let oldest = self.backup_path(self.policy.max_backups);
            if let Err(e) = fs::remove_file(&oldest) {
                if e.kind() != ErrorKind::NotFound {
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove oldest backup {}: {}",
                        oldest.display(),
                        e
                    );
                }
            }

            for i in (1..self.policy.max_backups).rev() {
                let from = self.backup_path(i);
                if !from.exists() {
                    continue;
                }
                if let Err(e) = rename_replacing(&from, &self.backup_path(i + 1)) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to shift backup {}: {}",
                        from.display(),
                        e
                    );
                }
            }

            rename_replacing(&self.base_path, &self.backup_path(1)).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        } else if let Err(e) = fs::remove_file(&self.base_path) {
            if e.kind() != ErrorKind::NotFound {
                return Err(LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to remove current log file: {}", e),
                ));
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        state.file = Some(file);
        state.size = 0;
        Ok(())
    }

    /// Path of backup number `index` (`1` is the most recent)
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self
            .base_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "app.log".into());
        name.push(format!(".{}", index));
        self.base_path.with_file_name(name)
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

/// `rename`, falling back to remove-then-rename where the target must not exist
fn rename_replacing(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) if to.exists() => {
            let _ = fs::remove_file(to);
            fs::rename(from, to)
        }
        Err(e) => Err(e),
    }
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        "rotating_file"
    }

    fn append(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.format(record)?;
        line.push('\n');
        self.write_bytes(line.as_bytes())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(ref mut file) = state.file {
            file.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        if let Some(mut file) = state.file.take() {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LogRecord};
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    const KB: usize = 1024;

    fn file_len(path: &Path) -> u64 {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }

    #[test]
    fn test_creation_seeds_size_from_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("existing.log");
        fs::write(&path, vec![b'x'; 1234]).unwrap();

        let appender = RotatingFileAppender::new(&path).unwrap();
        assert_eq!(appender.path(), path);
        assert_eq!(appender.current_size(), 1234);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");

        let appender = RotatingFileAppender::new(&path).unwrap();
        appender.write_bytes(b"hello\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rotation_keeps_whole_write_in_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let appender =
            RotatingFileAppender::with_policy(&path, RotationPolicy::with_max_size_mb(1, 2)).unwrap();

        appender.write_bytes(&vec![b'a'; 900 * KB]).unwrap();
        appender.write_bytes(&vec![b'b'; 200 * KB]).unwrap();

        let active = fs::read(&path).unwrap();
        let backup = fs::read(appender.backup_path(1)).unwrap();
        assert_eq!(active.len(), 200 * KB);
        assert!(active.iter().all(|&b| b == b'b'));
        assert_eq!(backup.len(), 900 * KB);
        assert!(backup.iter().all(|&b| b == b'a'));
        assert!(!appender.backup_path(2).exists());
        assert_eq!(appender.current_size(), (200 * KB) as u64);
    }

    #[test]
    fn test_rotation_without_backups_discards_old_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let appender =
            RotatingFileAppender::with_policy(&path, RotationPolicy::with_max_size_mb(1, 0)).unwrap();

        appender.write_bytes(&vec![b'a'; 900 * KB]).unwrap();
        appender.write_bytes(&vec![b'b'; 200 * KB]).unwrap();

        assert!(!appender.backup_path(1).exists());
        assert_eq!(file_len(&path), (200 * KB) as u64);
    }

    #[test]
    fn test_backups_shift_and_oldest_is_discarded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shift.log");
        let appender = RotatingFileAppender::with_policy(&path, RotationPolicy::new(10, 2)).unwrap();

        for chunk in [b"first-----", b"second----", b"third-----", b"fourth----"] {
            appender.write_bytes(chunk).unwrap();
        }

        assert_eq!(fs::read(&path).unwrap(), b"fourth----");
        assert_eq!(fs::read(appender.backup_path(1)).unwrap(), b"third-----");
        assert_eq!(fs::read(appender.backup_path(2)).unwrap(), b"second----");
        assert!(!appender.backup_path(3).exists());
    }

    #[test]
    fn test_exact_fit_does_not_rotate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fit.log");
        let appender = RotatingFileAppender::with_policy(&path, RotationPolicy::new(10, 1)).unwrap();

        appender.write_bytes(b"12345").unwrap();
        appender.write_bytes(b"67890").unwrap();

        assert!(!appender.backup_path(1).exists());
        assert_eq!(fs::read(&path).unwrap(), b"1234567890");
    }

    #[test]
    fn test_empty_file_exempt_from_size_plus_len_rule() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.log");
        let appender = RotatingFileAppender::with_policy(&path, RotationPolicy::new(4, 2)).unwrap();

        // 0 + 24 > 4 would rotate under the bare rule; an empty file is
        // written to instead so no empty backup is produced
        appender.write_bytes(b"way more than four bytes").unwrap();
        assert!(!appender.backup_path(1).exists());
        assert_eq!(appender.current_size(), 24);

        // Once the file holds data the rule applies as written
        appender.write_bytes(b"next").unwrap();
        assert_eq!(fs::read(appender.backup_path(1)).unwrap(), b"way more than four bytes");
        assert_eq!(appender.current_size(), 4);
    }

    #[test]
    fn test_disabled_policy_never_rotates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.log");
        let appender =
            RotatingFileAppender::with_policy(&path, RotationPolicy::disabled()).unwrap();

        for _ in 0..100 {
            appender.write_bytes(&[b'z'; KB]).unwrap();
        }

        assert!(!appender.backup_path(1).exists());
        assert_eq!(file_len(&path), (100 * KB) as u64);
    }

    #[test]
    fn test_restart_resumes_size_accounting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("restart.log");
        let policy = RotationPolicy::new(100, 1);

        {
            let appender = RotatingFileAppender::with_policy(&path, policy.clone()).unwrap();
            appender.write_bytes(&[b'a'; 80]).unwrap();
            appender.close().unwrap();
        }

        let appender = RotatingFileAppender::with_policy(&path, policy).unwrap();
        assert_eq!(appender.current_size(), 80);
        appender.write_bytes(&[b'b'; 30]).unwrap();

        assert_eq!(file_len(&appender.backup_path(1)), 80);
        assert_eq!(file_len(&path), 30);
    }

    #[test]
    fn test_append_formats_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.log");
        let appender = RotatingFileAppender::new(&path).unwrap();

        appender
            .append(&LogRecord::new(LogLevel::Info, "first").with_field("n", 1))
            .unwrap();
        appender
            .append(&LogRecord::new(LogLevel::Error, "second"))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO  first n=1"));
        assert!(lines[1].contains("ERROR second"));
    }

    #[test]
    fn test_close_is_idempotent_and_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("closed.log");
        let appender = RotatingFileAppender::new(&path).unwrap();

        appender.close().unwrap();
        appender.close().unwrap();

        let err = appender.write_bytes(b"late").unwrap_err();
        assert!(matches!(err, LoggerError::AppenderClosed { .. }));
    }

    #[test]
    fn test_concurrent_writers_never_split_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("concurrent.log");
        let appender = Arc::new(
            RotatingFileAppender::with_policy(&path, RotationPolicy::new(2 * KB as u64, 50)).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let appender = Arc::clone(&appender);
                thread::spawn(move || {
                    for i in 0..100 {
                        let line = format!("thread-{}-line-{:04}\n", t, i);
                        appender.write_bytes(line.as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut total_lines = 0;
        for index in 0..=50 {
            let file = if index == 0 {
                path.clone()
            } else {
                appender.backup_path(index)
            };
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            assert!(content.len() as u64 <= 2 * KB as u64);
            for line in content.lines() {
                assert!(line.starts_with("thread-") && line.len() == 18, "{:?}", line);
                total_lines += 1;
            }
        }
        assert_eq!(total_lines, 400);
    }
}
