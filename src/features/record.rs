//! Access-log line grammar: `<ip> <ident> <user> [<timestamp>] "<request>" <status> ...`.
//!
//! The status is a run of ASCII digits that fits a `u32`; anything else
//! makes the line unparseable.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r#"^(\S+) \S+ \S+ \[.*?\] "(.*?)" ([0-9]+)"#).expect("static access-log pattern")
    })
}

/// The fields of one access-log line consumed by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub client_address: String,
    pub request_line: String,
    pub status_code: u32,
}

/// Parse one raw line. Lines that do not match the grammar yield `None`.
pub fn extract(raw_line: &str) -> Option<LogRecord> {
    let caps = line_pattern().captures(raw_line)?;
    let status_code = caps.get(3)?.as_str().parse::<u32>().ok()?;
    Some(LogRecord {
        client_address: caps.get(1)?.as_str().to_string(),
        request_line: caps.get(2)?.as_str().to_string(),
        status_code,
    })
}
