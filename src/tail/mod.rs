//! Log tailing subsystem.
//!
//! # Data Flow
//! ```text
//! Poll timer
//!     → stat file (missing? shrunk? replaced?)
//!     → read bytes from tracked offset to EOF
//!     → split on '\n', hold back unterminated tail
//!     → lossy UTF-8 decode, trim, skip blanks
//!     → lines handed to the monitor loop
//! ```
//!
//! # Design Decisions
//! - Polling rather than filesystem events: works on every mount type
//! - Truncation, removal and inode change all restart at offset 0
//! - Stale buffered bytes are discarded on restart, never yielded
//! - Read errors back off and retry; the tailer never gives up

pub mod reader;

pub use reader::{LogTailer, PollOutcome, TailError};
