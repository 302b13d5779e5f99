//! Access-log failover and error-rate watcher.
//!
//! # Architecture Overview
//!
//! ```text
//!   access.log (growing, rotated)
//!        │
//!        ▼
//!   ┌─────────┐   lines   ┌─────────┐  LogRecord  ┌──────────────────────┐
//!   │  tail   │──────────▶│ parser  │────────────▶│      detection       │
//!   │ tailer  │           └─────────┘             │ window · recent · pool│
//!   └─────────┘                                   └──────────┬───────────┘
//!                                                            │ condition
//!                                                            ▼
//!   ┌──────────────┐   queue   ┌──────────────┐  granted ┌──────────┐
//!   │   notifier   │◀──────────│  dispatcher  │◀─────────│   gate   │
//!   │  (webhook)   │           │ (bg worker)  │          │ cooldown │
//!   └──────────────┘           └──────────────┘          └──────────┘
//!
//!   Cross-cutting: config · cli · lifecycle · observability · resilience
//! ```

pub mod alerting;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod tail;

pub use config::schema::WatcherConfig;
pub use error::WatcherError;
pub use lifecycle::Shutdown;
pub use monitor::{Monitor, WatchEngine};
