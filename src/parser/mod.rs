//! Access-log record parsing.
//!
//! # Responsibilities
//! - Decode one JSON log line into a [`LogRecord`]
//! - Extract the status code and the pool label, nothing else
//!
//! # Design Decisions
//! - Only two fields are read; the rest of the schema is not validated
//! - The pool label is looked up under several field names in priority order
//! - Empty and `-` pool values mean "not reported", same as a missing field
//! - Failures are returned as `ParseError`; the caller logs and drops the line

pub mod record;

pub use record::{LogRecord, ParseError, RecordParser};
