//! Per-line detection engine.
//!
//! Owns every piece of mutable watcher state and turns one log line into
//! zero or more gated alerts. It performs no I/O, so every decision can be
//! tested with synthetic lines and instants.

use std::time::Instant;

use chrono::Utc;

use crate::alerting::alert::truncate_chars;
use crate::alerting::{Alert, AlertGate, AlertKind, GateDecision};
use crate::config::WatcherConfig;
use crate::detection::{ErrorWindow, PoolChange, PoolMonitor, RecentLines};
use crate::observability::metrics;
use crate::parser::{ParseError, RecordParser};

/// Point-in-time view of the engine, logged periodically.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub processed: u64,
    pub parse_failures: u64,
    pub window_len: usize,
    pub error_count: usize,
    /// Raw window rate, reported even before the sample minimum is met.
    pub rate: f64,
    pub pool: String,
}

/// What processing one line produced.
#[derive(Debug, Default)]
pub struct LineOutcome {
    /// Alerts that passed their cooldown gate, in detection order.
    pub alerts: Vec<Alert>,
    /// Present every `status_interval` processed records.
    pub snapshot: Option<StatusSnapshot>,
}

#[derive(Debug)]
pub struct WatchEngine {
    parser: RecordParser,
    window: ErrorWindow,
    recent: RecentLines,
    pool: PoolMonitor,
    gate: AlertGate,
    threshold: f64,
    status_interval: u64,
    sample_chars: usize,
    evidence_lines: usize,
    processed: u64,
    parse_failures: u64,
}

impl WatchEngine {
    pub fn new(config: &WatcherConfig) -> Self {
        let detection = &config.detection;
        Self {
            parser: RecordParser::new(&detection.status_field, detection.pool_fields.clone()),
            window: ErrorWindow::new(detection.window_size),
            recent: RecentLines::new(detection.window_size),
            pool: PoolMonitor::new(&detection.active_pool),
            gate: AlertGate::new(config.alerts.cooldown()),
            threshold: detection.error_rate_threshold,
            status_interval: detection.status_interval.max(1),
            sample_chars: config.alerts.sample_chars,
            evidence_lines: config.alerts.evidence_lines,
            processed: 0,
            parse_failures: 0,
        }
    }

    /// Run one line through parse → window → pool → gates.
    ///
    /// A line that fails to parse leaves all detection state untouched.
    pub fn process_line(&mut self, line: &str, now: Instant) -> Result<LineOutcome, ParseError> {
        let record = match self.parser.parse(line) {
            Ok(record) => record,
            Err(e) => {
                self.parse_failures += 1;
                metrics::record_parse_failure();
                return Err(e);
            }
        };

        self.processed += 1;
        metrics::record_processed();
        self.window.record(record.is_server_error());
        self.recent.push(record.raw.as_str());

        let mut outcome = LineOutcome::default();

        if let Some(change) = self.pool.observe(record.pool.as_deref()) {
            tracing::warn!(previous = %change.previous, current = %change.current, "Pool changed");
            if self.permit(AlertKind::Failover, now) {
                outcome.alerts.push(self.failover_alert(change, &record.raw));
            }
        }

        if let Some(rate) = self.window.current_rate() {
            if rate >= self.threshold && self.permit(AlertKind::ErrorRate, now) {
                outcome.alerts.push(self.error_rate_alert(rate));
            }
        }

        metrics::record_window(self.window.len(), self.window.raw_rate());

        if self.processed % self.status_interval == 0 {
            outcome.snapshot = Some(self.snapshot());
        }

        Ok(outcome)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            processed: self.processed,
            parse_failures: self.parse_failures,
            window_len: self.window.len(),
            error_count: self.window.error_count(),
            rate: self.window.raw_rate(),
            pool: self.pool.current().to_string(),
        }
    }

    pub fn window(&self) -> &ErrorWindow {
        &self.window
    }

    pub fn current_pool(&self) -> &str {
        self.pool.current()
    }

    pub fn gate(&self) -> &AlertGate {
        &self.gate
    }

    fn permit(&self, kind: AlertKind, now: Instant) -> bool {
        match self.gate.try_fire(kind, now) {
            GateDecision::Granted => {
                metrics::record_alert_fired(kind);
                true
            }
            GateDecision::Suppressed { elapsed } => {
                tracing::debug!(
                    kind = %kind,
                    elapsed_secs = elapsed.as_secs(),
                    cooldown_secs = self.gate.cooldown().as_secs(),
                    "Alert suppressed by cooldown"
                );
                metrics::record_alert_suppressed(kind, "cooldown");
                false
            }
        }
    }

    fn failover_alert(&self, change: PoolChange, raw: &str) -> Alert {
        Alert::Failover {
            previous: change.previous,
            current: change.current,
            sample: truncate_chars(raw, self.sample_chars).to_string(),
            detected_at: Utc::now(),
        }
    }

    fn error_rate_alert(&self, rate: f64) -> Alert {
        let evidence = self
            .recent
            .latest(self.evidence_lines)
            .iter()
            .map(|line| truncate_chars(line, self.sample_chars).to_string())
            .collect();

        Alert::ErrorRate {
            rate,
            threshold: self.threshold,
            window_len: self.window.len(),
            error_count: self.window.error_count(),
            evidence,
            detected_at: Utc::now(),
        }
    }
}
