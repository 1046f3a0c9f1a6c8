use std::io;

use crate::log::log_record::LogRecord;

/// Destination that turns an assembled record into bytes.
///
/// The logger calls `write` exactly once per accepted record. Implementations
/// own their encoding and report every I/O failure instead of retrying.
pub trait LogSink: Send + Sync {
    fn write(&self, record: LogRecord) -> io::Result<()>;
}

/// Lets several loggers share one sink.
impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn write(&self, record: LogRecord) -> io::Result<()> {
        (**self).write(record)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&self, record: LogRecord) -> io::Result<()> {
        (**self).write(record)
    }
}
