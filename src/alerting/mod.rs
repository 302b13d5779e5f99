//! Alerting subsystem.
//!
//! # Data Flow
//! ```text
//! Detected condition (pool change / elevated error rate)
//!     → gate.rs (per-kind cooldown, atomic check-and-set)
//!     → alert.rs (build payload, render title + body)
//!     → dispatcher.rs (bounded queue, never blocks the monitor loop)
//!     → notifier.rs (webhook POST with timeout)
//! ```
//!
//! # Design Decisions
//! - Decision (gate) is separated from effect (notifier)
//! - Failover and error-rate cooldowns are independent
//! - A failed delivery still consumes the cooldown slot
//! - Queue overflow drops the newest alert with a warning

pub mod alert;
pub mod dispatcher;
pub mod gate;
pub mod notifier;

pub use alert::Alert;
pub use dispatcher::{AlertDispatcher, DeliveryStats};
pub use gate::{AlertGate, AlertKind, GateDecision};
pub use notifier::{Notifier, NotifyError, WebhookNotifier};
