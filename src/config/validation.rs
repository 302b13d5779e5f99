//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold within a percentage, windows non-empty)
//! - Check the webhook URL and metrics address are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::WatcherConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("error_rate_threshold must be in (0, 100], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("window_size must be at least 1")]
    EmptyWindow,

    #[error("active_pool must not be empty")]
    EmptyActivePool,

    #[error("pool_fields must name at least one field")]
    NoPoolFields,

    #[error("status_field must not be empty")]
    EmptyStatusField,

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("webhook_url is invalid: {0}")]
    InvalidWebhook(String),

    #[error("metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &WatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let detection = &config.detection;

    let threshold = detection.error_rate_threshold;
    if !(threshold > 0.0 && threshold <= 100.0) {
        errors.push(ValidationError::ThresholdOutOfRange(threshold));
    }
    if detection.window_size == 0 {
        errors.push(ValidationError::EmptyWindow);
    }
    if detection.active_pool.trim().is_empty() {
        errors.push(ValidationError::EmptyActivePool);
    }
    if detection.pool_fields.iter().all(|f| f.trim().is_empty()) {
        errors.push(ValidationError::NoPoolFields);
    }
    if detection.status_field.trim().is_empty() {
        errors.push(ValidationError::EmptyStatusField);
    }
    if detection.status_interval == 0 {
        errors.push(ValidationError::Zero("status_interval"));
    }

    let alerts = &config.alerts;
    if alerts.queue_capacity == 0 {
        errors.push(ValidationError::Zero("queue_capacity"));
    }
    if alerts.notify_timeout_secs == 0 {
        errors.push(ValidationError::Zero("notify_timeout_secs"));
    }
    if let Some(raw) = &alerts.webhook_url {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::InvalidWebhook(format!(
                "unsupported scheme '{}'",
                url.scheme()
            ))),
            Err(e) => errors.push(ValidationError::InvalidWebhook(e.to_string())),
        }
    }

    let tail = &config.tail;
    for (name, value) in [
        ("tail.poll_interval_ms", tail.poll_interval_ms),
        ("tail.missing_poll_ms", tail.missing_poll_ms),
        ("tail.error_backoff_ms", tail.error_backoff_ms),
        ("tail.max_backoff_ms", tail.max_backoff_ms),
        ("startup.wait_poll_ms", config.startup.wait_poll_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
