//! The monitor loop: tail → engine → dispatcher.

use std::time::Instant;

use tokio::sync::broadcast;

use crate::alerting::alert::truncate_chars;
use crate::alerting::{Alert, AlertDispatcher};
use crate::monitor::engine::{StatusSnapshot, WatchEngine};
use crate::observability::metrics;
use crate::tail::LogTailer;

/// Drives the watcher until shutdown.
pub struct Monitor {
    engine: WatchEngine,
    tailer: LogTailer,
    dispatcher: AlertDispatcher,
    maintenance_mode: bool,
}

impl Monitor {
    pub fn new(
        engine: WatchEngine,
        tailer: LogTailer,
        dispatcher: AlertDispatcher,
        maintenance_mode: bool,
    ) -> Self {
        Self {
            engine,
            tailer,
            dispatcher,
            maintenance_mode,
        }
    }

    /// Process lines until `shutdown` fires. Returns the final status.
    ///
    /// Dropping the monitor on return closes the alert queue, letting the
    /// delivery worker finish.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> StatusSnapshot {
        tracing::info!(path = %self.tailer.path().display(), "Monitor starting");

        loop {
            let lines = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Monitor received shutdown signal, exiting loop");
                    break;
                }
                lines = self.tailer.next_lines() => lines,
            };

            for line in &lines {
                self.handle_line(line);
            }
        }

        self.engine.snapshot()
    }

    /// Process a single line. Failures are logged and contained to the line.
    pub fn handle_line(&mut self, line: &str) {
        let outcome = match self.engine.process_line(line, Instant::now()) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, line = truncate_chars(line, 100), "Dropping unparseable log line");
                return;
            }
        };

        for alert in outcome.alerts {
            self.send(alert);
        }

        if let Some(status) = outcome.snapshot {
            tracing::info!(
                processed = status.processed,
                window = status.window_len,
                errors = status.error_count,
                rate = %format!("{:.2}%", status.rate),
                pool = %status.pool,
                parse_failures = status.parse_failures,
                "Status"
            );
        }
    }

    pub fn engine(&self) -> &WatchEngine {
        &self.engine
    }

    fn send(&self, alert: Alert) {
        let kind = alert.kind();
        if self.maintenance_mode {
            tracing::info!(kind = %kind, alert = %alert.summary(), "Maintenance mode, suppressing alert");
            metrics::record_alert_suppressed(kind, "maintenance");
            return;
        }

        tracing::warn!(kind = %kind, alert = %alert.summary(), "Alert");
        self.dispatcher.dispatch(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::{Notifier, NotifyError};
    use crate::config::WatcherConfig;
    use crate::lifecycle::Shutdown;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Notifier for Recorder {
        fn notify(
            &self,
            _body: &str,
            title: Option<&str>,
        ) -> impl Future<Output = Result<(), NotifyError>> + Send {
            self.0.lock().unwrap().push(title.unwrap_or_default().to_string());
            std::future::ready(Ok(()))
        }
    }

    fn build(maintenance: bool, shutdown: &Shutdown, recorder: Recorder) -> (Monitor, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = WatcherConfig::default();
        let (dispatcher, _worker) =
            AlertDispatcher::spawn(recorder, 8, Duration::from_secs(1), shutdown.subscribe());
        let tailer = LogTailer::new(dir.path().join("access.log"), &config.tail);
        (
            Monitor::new(WatchEngine::new(&config), tailer, dispatcher, maintenance),
            dir,
        )
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_processing() {
        let shutdown = Shutdown::new();
        let (mut monitor, _dir) = build(false, &shutdown, Recorder::default());

        monitor.handle_line("garbage");
        monitor.handle_line(r#"{"status":200,"pool":"blue"}"#);

        let status = monitor.engine().snapshot();
        assert_eq!(status.processed, 1);
        assert_eq!(status.parse_failures, 1);
    }

    #[tokio::test]
    async fn test_maintenance_mode_consumes_cooldown_without_sending() {
        let shutdown = Shutdown::new();
        let recorder = Recorder::default();
        let (mut monitor, _dir) = build(true, &shutdown, recorder.clone());

        monitor.handle_line(r#"{"status":200,"pool":"green"}"#);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(recorder.0.lock().unwrap().is_empty());
        assert!(monitor
            .engine()
            .gate()
            .last_fired(crate::alerting::AlertKind::Failover)
            .is_some());
    }

    #[tokio::test]
    async fn test_alert_reaches_notifier() {
        let shutdown = Shutdown::new();
        let recorder = Recorder::default();
        let (mut monitor, _dir) = build(false, &shutdown, recorder.clone());

        monitor.handle_line(r#"{"status":200,"pool":"green"}"#);
        drop(monitor);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*recorder.0.lock().unwrap(), vec!["🚨 Failover Detected".to_string()]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let (monitor, _dir) = build(false, &shutdown, Recorder::default());

        let handle = tokio::spawn(monitor.run(shutdown.subscribe()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();

        let status = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.processed, 0);
    }
}
