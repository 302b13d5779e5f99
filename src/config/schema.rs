//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the log watcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Access log to tail.
    pub log_path: PathBuf,

    /// Error-rate window and pool tracking.
    pub detection: DetectionConfig,

    /// Cooldown, maintenance mode and delivery settings.
    pub alerts: AlertConfig,

    /// Tailer polling cadence.
    pub tail: TailConfig,

    /// Startup behavior (waiting for the log file).
    pub startup: StartupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("/var/log/nginx/access.log"),
            detection: DetectionConfig::default(),
            alerts: AlertConfig::default(),
            tail: TailConfig::default(),
            startup: StartupConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Error rate (percent) at or above which an error-rate alert fires.
    pub error_rate_threshold: f64,

    /// Number of most recent requests in the sliding window.
    pub window_size: usize,

    /// Pool expected to be serving traffic at startup.
    pub active_pool: String,

    /// Emit a status snapshot every N processed records.
    pub status_interval: u64,

    /// JSON field holding the HTTP status.
    pub status_field: String,

    /// JSON fields checked for the pool label, in priority order.
    pub pool_fields: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: 2.0,
            window_size: 200,
            active_pool: "blue".to_string(),
            status_interval: 50,
            status_field: "status".to_string(),
            pool_fields: vec!["pool".to_string(), "upstream_pool".to_string()],
        }
    }
}

/// Alert gating and delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum gap between two alerts of the same kind, in seconds.
    pub cooldown_secs: u64,

    /// Compute alerts but never deliver them.
    pub maintenance_mode: bool,

    /// Incoming-webhook URL. Alerts are only logged when unset.
    pub webhook_url: Option<String>,

    /// Per-delivery timeout in seconds.
    pub notify_timeout_secs: u64,

    /// Pending alerts held for the delivery worker before new ones are dropped.
    pub queue_capacity: usize,

    /// Maximum characters of a raw log line quoted in an alert.
    pub sample_chars: usize,

    /// Recent log lines attached to an error-rate alert.
    pub evidence_lines: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 300,
            maintenance_mode: false,
            webhook_url: None,
            notify_timeout_secs: 5,
            queue_capacity: 32,
            sample_chars: 500,
            evidence_lines: 5,
        }
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

/// Tailer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TailConfig {
    /// Sleep between polls when the file has not grown, in milliseconds.
    pub poll_interval_ms: u64,

    /// Sleep between polls while the file does not exist, in milliseconds.
    pub missing_poll_ms: u64,

    /// Base backoff after a failed poll, in milliseconds.
    pub error_backoff_ms: u64,

    /// Upper bound for the backoff, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            missing_poll_ms: 1000,
            error_backoff_ms: 1000,
            max_backoff_ms: 5000,
        }
    }
}

/// Startup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StartupConfig {
    /// How long to wait for the log file to appear before giving up.
    pub wait_timeout_secs: u64,

    /// Poll interval while waiting, in milliseconds.
    pub wait_poll_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 60,
            wait_poll_ms: 500,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
