use std::sync::Arc;

use crate::{
    config::{Config, ConfigError, expand_path, invalid},
    log::{
        file_sink::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, FileSink},
        log_error::LogError,
        log_level::LogLevel,
        log_message::{Context, Message},
        log_record::{LogRecord, now_iso8601},
        log_sink::LogSink,
        request_context::RequestContext,
        stream_sink::{Destination, StreamSink},
    },
};

/// Config section read by [`Logger::from_config`].
pub const CONFIG_SECTION: &str = "Logging";

/// Minimum level used when none is configured.
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Info;

/// Severity-named entry points layered over one `log` operation.
///
/// Implementors only provide [`LevelLogger::log`]; each convenience method forwards
/// its message and context unchanged with a fixed level.
pub trait LevelLogger {
    /// Filters, enriches and dispatches one message.
    ///
    /// # Errors
    /// Returns [`LogError::Io`] when the sink fails. Records below the minimum
    /// level are dropped and reported as success.
    fn log(&self, level: LogLevel, message: Message, context: &Context) -> Result<(), LogError>;

    fn debug(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Debug, message.into(), context)
    }

    fn info(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Info, message.into(), context)
    }

    fn notice(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Notice, message.into(), context)
    }

    fn warning(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Warning, message.into(), context)
    }

    fn error(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Error, message.into(), context)
    }

    fn critical(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Critical, message.into(), context)
    }

    fn alert(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Alert, message.into(), context)
    }

    fn emergency(&self, message: impl Into<Message>, context: &Context) -> Result<(), LogError>
    where
        Self: Sized,
    {
        self.log(LogLevel::Emergency, message.into(), context)
    }

    /// String-typed entry point: rejects names outside the eight levels.
    ///
    /// # Errors
    /// [`LogError::InvalidLevel`] for an unknown name, without touching the sink;
    /// otherwise as [`LevelLogger::log`].
    fn log_named(
        &self,
        level: &str,
        message: impl Into<Message>,
        context: &Context,
    ) -> Result<(), LogError>
    where
        Self: Sized,
    {
        let level = level.parse::<LogLevel>()?;
        self.log(level, message.into(), context)
    }
}

/// Synchronous leveled logger writing enriched records to one sink.
///
/// Every accepted call builds a fresh [`LogRecord`] on the calling thread and
/// returns after the sink finished (or failed). Changing the level or sink only
/// affects later calls.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = Arc::new(ProcessContext::new());
/// let logger = Logger::new(FileSink::new("/var/log/app"), ctx).with_level(LogLevel::Warning);
/// logger.warning("disk almost full", &Context::new())?;
/// ```
pub struct Logger {
    level: LogLevel,
    sink: Box<dyn LogSink>,
    context: Arc<dyn RequestContext>,
}

impl Logger {
    pub fn new<S: LogSink + 'static>(sink: S, context: Arc<dyn RequestContext>) -> Self {
        Self {
            level: DEFAULT_LEVEL,
            sink: Box::new(sink),
            context,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Builds a logger from the `[Logging]` section.
    ///
    /// Recognized keys: `level`, `handler` (`file` | `stream`), `save_path`,
    /// `dir_mode`, `file_mode`, `filename`, `append`. Missing keys fall back to
    /// globals, then to defaults.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an unknown level or handler, or a
    /// malformed mode or boolean.
    pub fn from_config(
        config: &Config,
        context: Arc<dyn RequestContext>,
    ) -> Result<Self, ConfigError> {
        let level_name =
            config.get_non_empty_or_default(CONFIG_SECTION, "level", DEFAULT_LEVEL.as_str());
        let level = level_name
            .parse::<LogLevel>()
            .map_err(|_| invalid(CONFIG_SECTION, "level", level_name))?;

        let sink: Box<dyn LogSink> =
            match config.get_non_empty_or_default(CONFIG_SECTION, "handler", "file") {
                "file" => Box::new(file_sink_from_config(config)?),
                "stream" => Box::new(stream_sink_from_config(config)?),
                other => return Err(invalid(CONFIG_SECTION, "handler", other)),
            };

        Ok(Self {
            level,
            sink,
            context,
        })
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn set_sink<S: LogSink + 'static>(&mut self, sink: S) {
        self.sink = Box::new(sink);
    }

    /// Whether a record at `level` would currently reach the sink.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.passes(self.level)
    }

    fn build_record(&self, level: LogLevel, message: &Message) -> LogRecord {
        let ctx = &self.context;
        LogRecord {
            time: now_iso8601(),
            level,
            host: if ctx.is_cli() {
                String::from("cli")
            } else {
                ctx.server_host()
            },
            request_id: ctx.request_id(),
            server_ip: ctx.server_ip(),
            client_ip: ctx.client_ip(),
            message: message.normalize(),
        }
    }
}

impl LevelLogger for Logger {
    fn log(&self, level: LogLevel, message: Message, _context: &Context) -> Result<(), LogError> {
        if !self.enabled(level) {
            return Ok(());
        }
        let record = self.build_record(level, &message);
        self.sink.write(record)?;
        Ok(())
    }
}

fn file_sink_from_config(config: &Config) -> Result<FileSink, ConfigError> {
    let save_path = expand_path(config.get_non_empty_or_default(
        CONFIG_SECTION,
        "save_path",
        "./logs",
    ));
    let dir_mode = config.get_mode(CONFIG_SECTION, "dir_mode", DEFAULT_DIR_MODE)?;
    let file_mode = config.get_mode(CONFIG_SECTION, "file_mode", DEFAULT_FILE_MODE)?;
    Ok(FileSink::new(save_path).with_modes(dir_mode, file_mode))
}

fn stream_sink_from_config(config: &Config) -> Result<StreamSink, ConfigError> {
    let filename = config.get_non_empty_or_default(CONFIG_SECTION, "filename", "stdout");
    let destination = match Destination::parse(filename) {
        Destination::Path(_) => Destination::Path(expand_path(filename)),
        other => other,
    };
    let append_mode = config.get_bool(CONFIG_SECTION, "append", false)?;
    Ok(StreamSink::new(destination).with_append(append_mode))
}
