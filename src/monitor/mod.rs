//! Monitor subsystem.
//!
//! # Data Flow
//! ```text
//! runner.rs (async loop)
//!     → tail::LogTailer::next_lines
//!     → engine.rs (parse, window, pool, cooldown gates; no I/O)
//!     → maintenance check
//!     → alerting::AlertDispatcher (non-blocking enqueue)
//! ```
//!
//! # Design Decisions
//! - One execution path owns all detection state; no locks on the hot path
//!   beyond the cooldown gate's own mutex
//! - A bad line is logged and skipped; the loop only exits on shutdown
//! - Every `status_interval` records a status line is logged

pub mod engine;
pub mod runner;

pub use engine::{LineOutcome, StatusSnapshot, WatchEngine};
pub use runner::Monitor;
