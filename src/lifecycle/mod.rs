//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Install signals → Wait for log file (bounded,
//!     cancellable) → Start monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → monitor loop and alert worker stop → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a log file that never appears is fatal
//! - Shutdown abandons in-flight polls and deliveries; all state is in memory

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{wait_for_log_file, wait_for_log_file_or_shutdown, StartupError, StartupWait};
