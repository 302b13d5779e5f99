//! Shared utilities for integration tests.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use failover_watcher::alerting::{AlertDispatcher, DeliveryStats, Notifier, NotifyError};
use failover_watcher::config::WatcherConfig;
use failover_watcher::lifecycle::Shutdown;
use failover_watcher::monitor::StatusSnapshot;
use failover_watcher::tail::LogTailer;
use failover_watcher::{Monitor, WatchEngine};
use tokio::task::JoinHandle;

/// A delivered (or attempted) alert.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub title: String,
    pub body: String,
}

/// Notifier that records every call and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    attempts: Arc<AtomicUsize>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.deliveries().into_iter().map(|d| d.title).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &self,
        body: &str,
        title: Option<&str>,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail {
            Err(NotifyError::Other("webhook unavailable".into()))
        } else {
            self.deliveries.lock().unwrap().push(Delivery {
                title: title.unwrap_or_default().to_string(),
                body: body.to_string(),
            });
            Ok(())
        };
        std::future::ready(result)
    }
}

/// Config with fast polling pointed at `log_path`.
pub fn test_config(log_path: &Path) -> WatcherConfig {
    let mut config = WatcherConfig::default();
    config.log_path = log_path.to_path_buf();
    config.tail.poll_interval_ms = 5;
    config.tail.missing_poll_ms = 5;
    config.tail.error_backoff_ms = 5;
    config.tail.max_backoff_ms = 20;
    config
}

/// JSON access-log line as nginx would write it.
pub fn access_line(status: u16, pool: &str) -> String {
    format!(
        r#"{{"time":"2024-03-09T14:05:00+00:00","method":"GET","uri":"/api/v1/items","status":{status},"pool":"{pool}","request_time":"0.004"}}"#
    )
}

pub fn append_lines(path: &Path, lines: &[String]) {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

/// A monitor running in the background over a real file.
#[allow(dead_code)]
pub struct Running {
    pub shutdown: Shutdown,
    pub log_path: PathBuf,
    monitor: JoinHandle<StatusSnapshot>,
    worker: JoinHandle<DeliveryStats>,
}

#[allow(dead_code)]
impl Running {
    pub fn start(config: WatcherConfig, notifier: RecordingNotifier) -> Self {
        let shutdown = Shutdown::new();
        let (dispatcher, worker) = AlertDispatcher::spawn(
            notifier,
            config.alerts.queue_capacity,
            config.alerts.notify_timeout(),
            shutdown.subscribe(),
        );
        let monitor = Monitor::new(
            WatchEngine::new(&config),
            LogTailer::new(&config.log_path, &config.tail),
            dispatcher,
            config.alerts.maintenance_mode,
        );
        let handle = tokio::spawn(monitor.run(shutdown.subscribe()));

        Self {
            shutdown,
            log_path: config.log_path,
            monitor: handle,
            worker,
        }
    }

    /// Stop the monitor and return its final status.
    pub async fn stop(self) -> StatusSnapshot {
        self.shutdown.trigger();
        let status = tokio::time::timeout(Duration::from_secs(5), self.monitor)
            .await
            .expect("monitor did not stop")
            .expect("monitor panicked");
        let _ = tokio::time::timeout(Duration::from_secs(5), self.worker).await;
        status
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
