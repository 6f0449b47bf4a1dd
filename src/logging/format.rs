//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::config::LogConfig;
use crate::detect::Detection;
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// One scored request as written to the result stream.
#[derive(Debug, Serialize)]
pub struct AnomalyLine<'a> {
    pub ts: String,
    pub client: &'a str,
    pub request: &'a str,
    pub status: u32,
    pub error: f32,
    pub anomalous: bool,
}

impl<'a> AnomalyLine<'a> {
    pub fn from_detection(d: &'a Detection) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            client: &d.record.client_address,
            request: &d.record.request_line,
            status: d.record.status_code,
            error: d.error,
            anomalous: d.is_anomalous,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr, keeping stdout for result lines.
    /// `RUST_LOG` wins over `config.level`. Returns false if one was already set.
    pub fn init(config: &LogConfig) -> bool {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
        let base = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let layer = if config.json {
            base.json().flatten_event(true).boxed()
        } else {
            base.compact().boxed()
        };
        tracing_subscriber::registry().with(filter).with(layer).try_init().is_ok()
    }

    /// Emit a single structured line without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
