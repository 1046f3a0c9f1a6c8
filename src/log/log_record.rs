use chrono::{Local, SecondsFormat};
use serde::Serialize;

use crate::log::{log_level::LogLevel, log_message::encode_lossy};

/// Represents a single, fully enriched log entry.
///
/// A record is built once per accepted `log` call, handed by value to exactly one
/// sink and never mutated afterwards. Field order matches the JSON key order
/// produced by [`LogRecord::to_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// ISO-8601 timestamp with numeric offset, e.g. `2026-10-17T09:30:00+02:00`.
    pub time: String,
    /// The severity of the record.
    pub level: LogLevel,
    /// `"cli"` for non-interactive runs, otherwise the serving host name.
    pub host: String,
    /// Opaque id of the current request or process invocation.
    #[serde(rename = "reqid")]
    pub request_id: String,
    pub server_ip: String,
    pub client_ip: String,
    /// Normalized, single-line message.
    pub message: String,
}

impl LogRecord {
    /// Renders the space-joined line used by level files, newline included.
    ///
    /// The level is implied by the file name and is not repeated.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut line = [
            self.time.as_str(),
            self.host.as_str(),
            self.request_id.as_str(),
            self.server_ip.as_str(),
            self.client_ip.as_str(),
            self.message.as_str(),
        ]
        .join(" ");
        line.push('\n');
        line
    }

    /// Renders the record as one compact JSON object followed by a newline.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut line = encode_lossy(self);
        line.push('\n');
        line
    }
}

/// Current local time formatted like `date('c')`: seconds precision, `+hh:mm` offset.
#[must_use]
pub fn now_iso8601() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
