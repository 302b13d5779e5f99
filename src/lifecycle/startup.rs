//! Startup checks.
//!
//! The watcher refuses to start if the log file never shows up: a typo in
//! the path would otherwise look like a quiet, healthy system.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

/// Errors that stop the watcher before monitoring starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("log file {} not found after {waited:?}", .path.display())]
    LogFileTimeout { path: PathBuf, waited: Duration },
}

/// Poll until `path` exists or `timeout` elapses.
pub async fn wait_for_log_file(
    path: &Path,
    timeout: Duration,
    poll: Duration,
) -> Result<(), StartupError> {
    let started = Instant::now();

    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "Log file found");
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(StartupError::LogFileTimeout {
                path: path.to_path_buf(),
                waited,
            });
        }

        tracing::debug!(path = %path.display(), waited_ms = waited.as_millis() as u64, "Log file not present yet");
        sleep(poll.min(timeout - waited)).await;
    }
}

/// How a cancellable startup wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupWait {
    /// The log file exists; monitoring can start.
    Ready,
    /// Shutdown was requested before the file appeared.
    Cancelled,
}

/// Like [`wait_for_log_file`], but returns early when `shutdown` fires.
pub async fn wait_for_log_file_or_shutdown(
    path: &Path,
    timeout: Duration,
    poll: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<StartupWait, StartupError> {
    tokio::select! {
        ready = wait_for_log_file(path, timeout, poll) => ready.map(|()| StartupWait::Ready),
        _ = shutdown.recv() => {
            tracing::info!(path = %path.display(), "Shutdown requested while waiting for log file");
            Ok(StartupWait::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_file_returns_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, b"").unwrap();

        wait_for_log_file(&path, Duration::ZERO, Duration::from_millis(10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_times_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.log");

        let err = wait_for_log_file(&path, Duration::from_millis(50), Duration::from_millis(10))
            .await
            .unwrap_err();
        let StartupError::LogFileTimeout { waited, .. } = err;
        assert!(waited >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_wait() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.log");
        let shutdown = crate::lifecycle::Shutdown::new();
        let rx = shutdown.subscribe();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            trigger.trigger();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_log_file_or_shutdown(&path, Duration::from_secs(60), Duration::from_millis(5), rx),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(outcome, StartupWait::Cancelled);
    }

    #[tokio::test]
    async fn test_ready_without_shutdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, b"").unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();

        let outcome = wait_for_log_file_or_shutdown(
            &path,
            Duration::from_secs(1),
            Duration::from_millis(5),
            shutdown.subscribe(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, StartupWait::Ready);
    }

    #[tokio::test]
    async fn test_file_appearing_later() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.log");

        let writer_path = path.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            tokio::fs::write(writer_path, b"").await.unwrap();
        });

        wait_for_log_file(&path, Duration::from_secs(5), Duration::from_millis(5))
            .await
            .unwrap();
    }
}
