//! Structured logging setup and ndjson result lines.

mod format;

pub use format::{AnomalyLine, StructuredLogger};
