//! Background alert delivery.
//!
//! The monitor loop hands alerts to a bounded queue and never waits on the
//! network. A single worker drains the queue, applying a per-delivery
//! timeout. When the queue is full the newest alert is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::alerting::alert::Alert;
use crate::alerting::notifier::{Notifier, NotifyError};
use crate::observability::metrics;

/// Counts reported by the worker when it exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Sending half of the alert queue.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    tx: mpsc::Sender<Alert>,
}

impl AlertDispatcher {
    /// Start the delivery worker.
    ///
    /// The worker exits when every dispatcher clone has been dropped and the
    /// queue is drained, or as soon as `shutdown` fires (abandoning any
    /// in-flight delivery).
    pub fn spawn<N>(
        notifier: N,
        capacity: usize,
        timeout: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<DeliveryStats>)
    where
        N: Notifier + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(deliver_alerts(Arc::new(notifier), rx, timeout, shutdown));
        (Self { tx }, worker)
    }

    /// Queue an alert without waiting. Returns false if it was dropped.
    pub fn dispatch(&self, alert: Alert) -> bool {
        let kind = alert.kind();
        match self.tx.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(alert)) => {
                tracing::warn!(kind = %kind, alert = %alert.summary(), "Alert queue full, dropping alert");
                metrics::record_alert_dropped(kind);
                false
            }
            Err(mpsc::error::TrySendError::Closed(alert)) => {
                tracing::warn!(kind = %kind, alert = %alert.summary(), "Alert worker stopped, dropping alert");
                metrics::record_alert_dropped(kind);
                false
            }
        }
    }
}

async fn deliver_alerts<N: Notifier>(
    notifier: Arc<N>,
    mut rx: mpsc::Receiver<Alert>,
    timeout: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> DeliveryStats {
    let mut stats = DeliveryStats::default();

    loop {
        let alert = tokio::select! {
            _ = shutdown.recv() => {
                tracing::debug!("Alert worker received shutdown signal");
                break;
            }
            next = rx.recv() => match next {
                Some(alert) => alert,
                None => break,
            },
        };

        let kind = alert.kind();
        let result = tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!(kind = %kind, "Abandoning in-flight alert delivery on shutdown");
                break;
            }
            result = deliver(notifier.as_ref(), &alert, timeout) => result,
        };

        match result {
            Ok(()) => {
                stats.delivered += 1;
                metrics::record_notification(kind, true);
                tracing::info!(kind = %kind, title = alert.title(), "Alert delivered");
            }
            Err(e) => {
                // Cooldown stays consumed: a flapping transport must not
                // turn into an alert storm.
                stats.failed += 1;
                metrics::record_notification(kind, false);
                tracing::error!(kind = %kind, error = %e, "Failed to deliver alert");
            }
        }
    }

    stats
}

async fn deliver<N: Notifier>(
    notifier: &N,
    alert: &Alert,
    timeout: Duration,
) -> Result<(), NotifyError> {
    let body = alert.body();
    match time::timeout(timeout, notifier.notify(&body, Some(alert.title()))).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout)),
    }
}
