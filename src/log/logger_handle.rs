use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::log::{
    log_error::LogError,
    log_level::LogLevel,
    log_message::{Context, Message},
    log_sink::LogSink,
    logger::{LevelLogger, Logger},
};

/// Lightweight, cloneable handle to a shared [`Logger`].
///
/// Create one at startup and pass clones to every module or thread that logs.
/// Logging takes a read lock, so concurrent callers do not serialize on each
/// other; reconfiguring takes the write lock and applies to later calls only.
///
/// # Examples
/// ```ignore
/// let handle = LoggerHandle::new(logger);
/// let worker = handle.clone();
/// std::thread::spawn(move || worker.info("started task", &Context::new()));
/// ```
#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<RwLock<Logger>>,
}

impl LoggerHandle {
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(logger)),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        self.write().set_level(level);
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.read().level()
    }

    pub fn set_sink<S: LogSink + 'static>(&self, sink: S) {
        self.write().set_sink(sink);
    }

    // A panic inside a sink cannot leave the logger half-updated, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Logger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Logger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Logger> for LoggerHandle {
    fn from(logger: Logger) -> Self {
        Self::new(logger)
    }
}

impl LevelLogger for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, message: Message, context: &Context) -> Result<(), LogError> {
        self.read().log(level, message, context)
    }
}
