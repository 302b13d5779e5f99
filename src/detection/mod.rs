//! Failure and failover detection.
//!
//! # Data Flow
//! ```text
//! LogRecord
//!     → window.rs (append 5xx flag, evict oldest, compute rate)
//!     → recent.rs (keep raw line as alert evidence)
//!     → pool.rs (compare pool label, emit PoolChange)
//! ```
//!
//! # Design Decisions
//! - Only 5xx count as failures; 4xx are client errors, not backend ones
//! - No rate is reported until max(10, capacity/4) samples exist
//! - A missing pool label is never read as a switch to "unknown"
//! - Components take `&mut self`; the engine that owns them serializes access

pub mod pool;
pub mod recent;
pub mod window;

pub use pool::{PoolChange, PoolMonitor};
pub use recent::RecentLines;
pub use window::ErrorWindow;
