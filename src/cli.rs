//! Command-line interface.
//!
//! Every flag falls back to the environment variable the container
//! deployment already sets, so the binary runs unchanged with either.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::WatcherConfig;

#[derive(Debug, Parser)]
#[command(name = "failover-watcher")]
#[command(about = "Tails an nginx JSON access log and alerts on failovers and 5xx spikes", long_about = None)]
pub struct Cli {
    /// TOML config file; flags and environment override its values.
    #[arg(short, long, env = "WATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Access log to tail.
    #[arg(long, env = "LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Incoming-webhook URL for alerts.
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Error-rate alert threshold, in percent.
    #[arg(long, env = "ERROR_RATE_THRESHOLD")]
    pub error_rate_threshold: Option<f64>,

    /// Number of requests in the sliding window.
    #[arg(long, env = "WINDOW_SIZE")]
    pub window_size: Option<usize>,

    /// Minimum seconds between two alerts of the same kind.
    #[arg(long, env = "ALERT_COOLDOWN_SEC")]
    pub cooldown_secs: Option<u64>,

    /// Pool expected to be serving at startup.
    #[arg(long, env = "ACTIVE_POOL")]
    pub active_pool: Option<String>,

    /// Compute alerts but do not send them (true/false, 1/0, yes/no).
    #[arg(long, env = "MAINTENANCE_MODE", value_parser = parse_switch)]
    pub maintenance_mode: Option<bool>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Build the effective configuration: defaults, then the config file,
    /// then environment/flags, then validation.
    pub fn load_config(&self) -> Result<WatcherConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => WatcherConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Layer the explicitly given options over `config`.
    pub fn apply(&self, config: &mut WatcherConfig) {
        if let Some(path) = &self.log_path {
            config.log_path = path.clone();
        }
        if let Some(url) = &self.webhook_url {
            // An empty SLACK_WEBHOOK_URL means "not configured".
            let url = url.trim();
            config.alerts.webhook_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(threshold) = self.error_rate_threshold {
            config.detection.error_rate_threshold = threshold;
        }
        if let Some(size) = self.window_size {
            config.detection.window_size = size;
        }
        if let Some(secs) = self.cooldown_secs {
            config.alerts.cooldown_secs = secs;
        }
        if let Some(pool) = &self.active_pool {
            config.detection.active_pool = pool.clone();
        }
        if let Some(maintenance) = self.maintenance_mode {
            config.alerts.maintenance_mode = maintenance;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(address) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address.clone();
        }
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("expected true/false, got '{other}'")),
    }
}
