pub mod file_sink;
pub mod locked_append;
pub mod log_error;
pub mod log_level;
pub mod log_macros;
pub mod log_message;
pub mod log_record;
pub mod log_sink;
pub mod logger;
pub mod logger_handle;
pub mod lossy_json;
pub mod request_context;
pub mod stream_sink;
pub use file_sink::FileSink;
pub use log_error::LogError;
pub use log_level::LogLevel;
pub use log_message::{Context, Message};
pub use log_record::LogRecord;
pub use log_sink::LogSink;
pub use logger::{LevelLogger, Logger};
pub use logger_handle::LoggerHandle;
pub use request_context::{ProcessContext, RequestContext, StaticContext};
pub use stream_sink::{Destination, StreamSink};
