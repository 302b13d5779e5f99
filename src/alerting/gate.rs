//! Per-kind alert cooldown.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The independent alert categories, each with its own cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Failover,
    ErrorRate,
}

impl AlertKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Failover => "failover",
            AlertKind::ErrorRate => "error_rate",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of asking the gate for permission to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Granted,
    /// Still cooling down; `elapsed` since the last firing of this kind.
    Suppressed { elapsed: Duration },
}

impl GateDecision {
    /// Whether the alert may be sent.
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }
}

/// Cooldown gate shared by all alert kinds.
///
/// Check-and-set happens under one lock, so two concurrent detections of the
/// same kind can never both be granted.
#[derive(Debug)]
pub struct AlertGate {
    cooldown: Duration,
    last_fired: Mutex<HashMap<AlertKind, Instant>>,
}

impl AlertGate {
    /// Create a gate where no kind has fired yet.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Grant and record `now` when `kind` has never fired or its cooldown
    /// has fully elapsed (`now - last >= cooldown`).
    pub fn try_fire(&self, kind: AlertKind, now: Instant) -> GateDecision {
        let mut last_fired = self
            .last_fired
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = last_fired.get(&kind) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.cooldown {
                return GateDecision::Suppressed { elapsed };
            }
        }

        last_fired.insert(kind, now);
        GateDecision::Granted
    }

    /// Minimum spacing between two alerts of one kind.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// When `kind` was last granted, if ever.
    pub fn last_fired(&self, kind: AlertKind) -> Option<Instant> {
        self.last_fired
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&kind)
            .copied()
    }
}
