//! Polling tailer for a growing log file.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::sleep;

use crate::config::TailConfig;
use crate::observability::metrics;
use crate::resilience::Backoff;

/// A line without a terminator is flushed once it grows past this size.
const MAX_PENDING_BYTES: usize = 1 << 20;

/// Upper bound on bytes read by a single poll.
const MAX_READ_BYTES: u64 = (MAX_PENDING_BYTES as u64) * 8;

/// Errors from a single poll. All of them are transient to the caller.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to stat {}: {source}", .path.display())]
    Metadata { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is not a regular file", .path.display())]
    NotAFile { path: PathBuf },
}

/// Result of one poll of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// New complete lines (possibly none if only a partial line arrived).
    Lines(Vec<String>),
    /// No growth since the last poll.
    Idle,
    /// The file does not exist.
    Missing,
    /// The file shrank or was replaced; reading restarts at offset 0.
    Reset,
}

/// Identity of the underlying file, used to notice replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(metadata: &std::fs::Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn of(_metadata: &std::fs::Metadata) -> Option<Self> {
        None
    }
}

/// Follows a log file by byte offset, surviving truncation and rotation.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    position: u64,
    /// Bytes after the last newline, waiting for their terminator.
    pending: Vec<u8>,
    identity: Option<FileIdentity>,
    max_read: u64,
    poll_interval: Duration,
    missing_interval: Duration,
    backoff: Backoff,
    waiting_logged: bool,
}

impl LogTailer {
    /// Create a tailer that starts reading `path` from offset 0.
    pub fn new(path: impl Into<PathBuf>, config: &TailConfig) -> Self {
        Self {
            path: path.into(),
            position: 0,
            pending: Vec::new(),
            identity: None,
            max_read: MAX_READ_BYTES,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            missing_interval: Duration::from_millis(config.missing_poll_ms),
            backoff: Backoff::new(
                Duration::from_millis(config.error_backoff_ms),
                Duration::from_millis(config.max_backoff_ms),
            ),
            waiting_logged: false,
        }
    }

    /// Path being followed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Check the file once and read whatever has been appended.
    ///
    /// Size, identity and content all come from one open handle, so a
    /// rotation between the check and the read cannot mix two files.
    pub async fn poll(&mut self) -> Result<PollOutcome, TailError> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.position > 0 || self.identity.is_some() {
                    tracing::info!(path = %self.path.display(), "Log file removed, will read replacement from start");
                    self.reset();
                    metrics::record_log_reset();
                }
                return Ok(PollOutcome::Missing);
            }
            Err(source) => {
                return Err(TailError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let metadata = file.metadata().await.map_err(|source| TailError::Metadata {
            path: self.path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(TailError::NotAFile {
                path: self.path.clone(),
            });
        }

        let identity = FileIdentity::of(&metadata);
        if self.identity.is_some() && identity != self.identity {
            tracing::info!(path = %self.path.display(), "Log file replaced, resetting position");
            self.reset();
            metrics::record_log_reset();
            return Ok(PollOutcome::Reset);
        }
        self.identity = identity;

        let size = metadata.len();
        if size < self.position {
            tracing::info!(
                path = %self.path.display(),
                size,
                position = self.position,
                "Log file truncated, resetting position"
            );
            self.reset();
            metrics::record_log_reset();
            return Ok(PollOutcome::Reset);
        }
        if size == self.position {
            return Ok(PollOutcome::Idle);
        }

        let chunk = self
            .read_chunk(&mut file)
            .await
            .map_err(|source| TailError::Read {
                path: self.path.clone(),
                source,
            })?;
        self.position += chunk.len() as u64;

        Ok(PollOutcome::Lines(self.take_lines(&chunk)))
    }

    /// Wait until at least one complete line is available.
    ///
    /// Never returns an error: missing files and failed reads are retried.
    pub async fn next_lines(&mut self) -> Vec<String> {
        loop {
            match self.poll().await {
                Ok(PollOutcome::Lines(lines)) => {
                    self.backoff.reset();
                    self.waiting_logged = false;
                    if !lines.is_empty() {
                        metrics::record_lines_read(lines.len());
                        return lines;
                    }
                    sleep(self.poll_interval).await;
                }
                Ok(PollOutcome::Idle) | Ok(PollOutcome::Reset) => {
                    self.backoff.reset();
                    sleep(self.poll_interval).await;
                }
                Ok(PollOutcome::Missing) => {
                    self.backoff.reset();
                    if !self.waiting_logged {
                        tracing::info!(path = %self.path.display(), "Waiting for log file to be created");
                        self.waiting_logged = true;
                    }
                    sleep(self.missing_interval).await;
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = self.backoff.attempts(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Error reading log file"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Read at most `max_read` bytes from the current position. Anything
    /// beyond that is picked up by the next poll.
    async fn read_chunk(&self, file: &mut File) -> io::Result<Vec<u8>> {
        file.seek(SeekFrom::Start(self.position)).await?;
        let mut chunk = Vec::new();
        file.take(self.max_read).read_to_end(&mut chunk).await?;
        Ok(chunk)
    }

    /// Split buffered bytes into trimmed, non-empty lines, keeping any
    /// unterminated tail for the next read.
    fn take_lines(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let complete: Vec<u8> = match self.pending.iter().rposition(|b| *b == b'\n') {
            Some(idx) => self.pending.drain(..=idx).collect(),
            None if self.pending.len() > MAX_PENDING_BYTES => {
                tracing::warn!(bytes = self.pending.len(), "Unterminated log line too long, flushing");
                std::mem::take(&mut self.pending)
            }
            None => return Vec::new(),
        };

        String::from_utf8_lossy(&complete)
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn reset(&mut self) {
        self.position = 0;
        self.pending.clear();
        self.identity = None;
    }
}
