//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watcher_lines_total` (counter): raw lines read from the log
//! - `watcher_records_total` (counter): lines parsed into records
//! - `watcher_parse_failures_total` (counter): lines dropped as malformed
//! - `watcher_log_resets_total` (counter): truncations/rotations observed
//! - `watcher_alerts_fired_total` (counter): alerts granted, by kind
//! - `watcher_alerts_suppressed_total` (counter): by kind and reason
//! - `watcher_alerts_dropped_total` (counter): queue overflow, by kind
//! - `watcher_notifications_total` (counter): deliveries by kind and outcome
//! - `watcher_error_rate_percent` (gauge): raw window error rate
//! - `watcher_window_len` (gauge): samples currently in the window
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no-ops until an exporter is installed
//! - Labels are static strings to keep cardinality fixed

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::alerting::AlertKind;

/// Install the Prometheus exporter and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_lines_read(count: usize) {
    metrics::counter!("watcher_lines_total").increment(count as u64);
}

pub fn record_processed() {
    metrics::counter!("watcher_records_total").increment(1);
}

pub fn record_parse_failure() {
    metrics::counter!("watcher_parse_failures_total").increment(1);
}

pub fn record_log_reset() {
    metrics::counter!("watcher_log_resets_total").increment(1);
}

pub fn record_alert_fired(kind: AlertKind) {
    metrics::counter!("watcher_alerts_fired_total", "kind" => kind.as_str()).increment(1);
}

/// `reason` is `cooldown` or `maintenance`.
pub fn record_alert_suppressed(kind: AlertKind, reason: &'static str) {
    metrics::counter!(
        "watcher_alerts_suppressed_total",
        "kind" => kind.as_str(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_alert_dropped(kind: AlertKind) {
    metrics::counter!("watcher_alerts_dropped_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_notification(kind: AlertKind, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "watcher_notifications_total",
        "kind" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_window(len: usize, rate: f64) {
    metrics::gauge!("watcher_window_len").set(len as f64);
    metrics::gauge!("watcher_error_rate_percent").set(rate);
}
