use core::fmt;
use std::io;

#[derive(Debug)]
pub enum LogError {
    /// The level name is not one of the eight recognized names.
    InvalidLevel(String),
    /// Directory creation, open, lock or write failed on the sink.
    Io(io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::InvalidLevel(name) => write!(f, "Invalid log level: {name:?}"),
            LogError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(e) => Some(e),
            LogError::InvalidLevel(_) => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        LogError::Io(e)
    }
}
