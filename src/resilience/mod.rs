//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed log poll:
//!     → backoff.rs (grow delay per consecutive failure, with jitter)
//!     → tailer sleeps, then retries; success resets the counter
//! ```
//!
//! # Design Decisions
//! - Transient I/O errors are never fatal; the tailer retries forever
//! - Delay is bounded so recovery is noticed quickly
//! - Jitter only shortens the delay, never exceeds the cap

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
