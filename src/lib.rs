//! reqlog is a small, synchronous leveled logger for request-serving processes.
//!
//! Each call is checked against a minimum level, stamped with request metadata
//! (time, request id, host, server and client IP) and written by one sink:
//! - `FileSink`: one space-joined line per record in `<dir>/<level>.log`.
//! - `StreamSink`: one JSON object per line on stdout, stderr or a file.
//!
//! Oversized records are appended in chunks under an advisory lock so that
//! concurrent processes never interleave them.

/// Handles configuration loading and management.
pub mod config;
/// Levels, records, sinks and the logger itself.
pub mod log;

pub use config::{Config, ConfigError};
pub use log::{
    Context, Destination, FileSink, LevelLogger, LogError, LogLevel, LogRecord, LogSink, Logger,
    LoggerHandle, Message, ProcessContext, RequestContext, StaticContext, StreamSink,
};
