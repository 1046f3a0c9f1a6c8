//! Formatting shorthands over any [`LevelLogger`](crate::log::logger::LevelLogger)
//! (`Logger`, `LoggerHandle`, or a reference to either).
//!
//! Each macro formats its arguments with `format!`, logs them with an empty
//! context and evaluates to the `Result` of the call, so the caller still decides
//! whether a failed write matters.
//!
//! ```rust,ignore
//! logger_warning!(logger, "queue depth {} over limit {}", depth, limit)?;
//! let _ = logger_debug!(handle, "cache miss for {key}");
//! ```

// ============================================================================
// 1. GENERIC MACRO
// ============================================================================

#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        use $crate::log::logger::LevelLogger as _;
        let __msg = format!($($arg)*);
        $logger.log(
            $lvl,
            $crate::log::log_message::Message::Text(__msg),
            &$crate::log::log_message::Context::new(),
        )
    }};
}

// ============================================================================
// 2. LEVEL-SPECIFIC MACROS
// ============================================================================

#[macro_export]
macro_rules! logger_debug     { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Debug, $($arg)*) } }
#[macro_export]
macro_rules! logger_info      { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Info, $($arg)*) } }
#[macro_export]
macro_rules! logger_notice    { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Notice, $($arg)*) } }
#[macro_export]
macro_rules! logger_warning   { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Warning, $($arg)*) } }
#[macro_export]
macro_rules! logger_error     { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Error, $($arg)*) } }
#[macro_export]
macro_rules! logger_critical  { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Critical, $($arg)*) } }
#[macro_export]
macro_rules! logger_alert     { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Alert, $($arg)*) } }
#[macro_export]
macro_rules! logger_emergency { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Emergency, $($arg)*) } }

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use crate::log::{
        log_level::LogLevel, log_record::LogRecord, log_sink::LogSink, logger::Logger,
        logger_handle::LoggerHandle, request_context::StaticContext,
    };
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    #[derive(Default)]
    struct Capture(Mutex<Vec<LogRecord>>);

    impl LogSink for Capture {
        fn write(&self, record: LogRecord) -> io::Result<()> {
            self.0.lock().unwrap().push(record);
            Ok(())
        }
    }

    #[test]
    fn macros_format_and_pick_level() {
        let sink = Arc::new(Capture::default());
        let logger = Logger::new(Arc::clone(&sink), Arc::new(StaticContext::cli("m")))
            .with_level(LogLevel::Debug);

        let n = 3;
        crate::logger_debug!(logger, "n = {n}").unwrap();
        crate::logger_info!(logger, "{} + {} = {}", 1, 2, 1 + 2).unwrap();
        crate::logger_notice!(logger, "notice").unwrap();
        crate::logger_warning!(logger, "warning").unwrap();
        crate::logger_error!(logger, "error").unwrap();
        crate::logger_critical!(&logger, "critical").unwrap();
        crate::logger_alert!(logger, "alert").unwrap();
        crate::logger_emergency!(logger, "emergency").unwrap();

        let records = sink.0.lock().unwrap();
        let levels: Vec<LogLevel> = records.iter().map(|r| r.level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
        assert_eq!(records[0].message, "n = 3");
        assert_eq!(records[1].message, "1 + 2 = 3");
    }

    #[test]
    fn macros_work_on_handles_and_respect_filter() {
        let sink = Arc::new(Capture::default());
        let handle = LoggerHandle::new(
            Logger::new(Arc::clone(&sink), Arc::new(StaticContext::cli("h")))
                .with_level(LogLevel::Error),
        );

        crate::logger_info!(handle, "filtered").unwrap();
        crate::logger_log!(handle, LogLevel::Alert, "kept {}", "line\nbreak").unwrap();

        let records = sink.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept line break");
    }
}
