//! Shared system log guarded by a lock file.
//!
//! Several demo processes append to one `system_log.txt` in the stream
//! directory. A writer waits while `log.lock` exists, takes the lock with an
//! exclusive create, appends one entry and removes the lock.

use crate::config::LogFileConfig;
use crate::error::{NodeError, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

/// Appends timestamped entries to the shared system log.
#[derive(Debug, Clone)]
pub struct SystemLog {
    source: String,
    lock_path: PathBuf,
    log_path: PathBuf,
    wait_timeout: Duration,
}

impl SystemLog {
    /// Log for process `source` inside `dir`.
    pub fn new(dir: &Path, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lock_path: dir.join(LogFileConfig::LOCK_FILE_NAME),
            log_path: dir.join(LogFileConfig::LOG_FILE_NAME),
            wait_timeout: LogFileConfig::LOCK_WAIT_TIMEOUT,
        }
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Append `[<timestamp>] [<source>]: <message>` on a new line.
    pub fn record(&self, message: &str) -> Result<()> {
        let _lock = self.acquire()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| self.io_error("Failed to open system log", &self.log_path, e))?;

        write!(
            file,
            "\n[{}] [{}]: {}",
            Utc::now().to_rfc3339(),
            self.source,
            message
        )
        .map_err(|e| self.io_error("Failed to append to system log", &self.log_path, e))
    }

    /// Record a message, downgrading any failure to a warning.
    pub fn note(&self, message: &str) {
        if let Err(e) = self.record(message) {
            warn!("System log entry dropped: {}", e);
        }
    }

    fn acquire(&self) -> Result<LockGuard> {
        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.lock_path)
            {
                Ok(_) => {
                    return Ok(LockGuard {
                        path: self.lock_path.clone(),
                    })
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= self.wait_timeout {
                        return Err(NodeError::LockTimeout {
                            path: self.lock_path.clone(),
                            waited: started.elapsed(),
                        });
                    }
                    thread::sleep(LogFileConfig::LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(self.io_error("Failed to create lock", &self.lock_path, e)),
            }
        }
    }

    fn io_error(&self, message: &str, path: &Path, source: std::io::Error) -> NodeError {
        NodeError::Io {
            message: message.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Removes the lock file when the entry is written or abandoned.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}
