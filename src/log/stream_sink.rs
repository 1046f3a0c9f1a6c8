use std::{
    fmt,
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use crate::log::{locked_append::append, log_record::LogRecord, log_sink::LogSink};

/// Where a [`StreamSink`] sends its JSON lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Stderr,
    Path(PathBuf),
}

impl Destination {
    /// Maps the sentinels `stdout` and `stderr` to the process streams; anything
    /// else is taken as a filesystem path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "stdout" => Destination::Stdout,
            "stderr" => Destination::Stderr,
            path => Destination::Path(PathBuf::from(path)),
        }
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Destination::parse(value)
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Destination::Path(path)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("stdout"),
            Destination::Stderr => f.write_str("stderr"),
            Destination::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Writes one compact JSON object per record to a single destination.
///
/// For [`Destination::Path`] the file is opened fresh for every record and, by
/// default, **truncated**: the file only ever holds the most recent record.
/// That is long-standing behaviour some consumers rely on ("latest entry"
/// status files). Call [`StreamSink::with_append`] to accumulate lines instead.
///
/// The process streams are shared handles; each record is written while holding
/// the std lock for that stream.
#[derive(Debug, Clone)]
pub struct StreamSink {
    destination: Destination,
    append_mode: bool,
}

impl StreamSink {
    pub fn new(destination: impl Into<Destination>) -> Self {
        Self {
            destination: destination.into(),
            append_mode: false,
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Destination::Stdout)
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Destination::Stderr)
    }

    /// Appends to path destinations instead of truncating them on every write.
    #[must_use]
    pub fn with_append(mut self, append_mode: bool) -> Self {
        self.append_mode = append_mode;
        self
    }

    pub fn set_destination(&mut self, destination: impl Into<Destination>) {
        self.destination = destination.into();
    }

    #[must_use]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    fn open_path(&self, path: &Path) -> io::Result<File> {
        if self.append_mode {
            OpenOptions::new().create(true).append(true).open(path)
        } else {
            File::create(path)
        }
    }
}

impl LogSink for StreamSink {
    fn write(&self, record: LogRecord) -> io::Result<()> {
        let payload = record.to_json();
        let bytes = payload.as_bytes();

        match &self.destination {
            Destination::Stdout => append(&mut io::stdout().lock(), bytes),
            Destination::Stderr => append(&mut io::stderr().lock(), bytes),
            Destination::Path(path) => {
                let mut file = self.open_path(path)?;
                append(&mut file, bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::{locked_append::CHUNK_SIZE, log_level::LogLevel};
    use rand::RngCore;
    use serde_json::Value;
    use std::fs;

    fn unique_temp_path(tag: &str) -> PathBuf {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        let suffix = u64::from_le_bytes(bytes);
        std::env::temp_dir().join(format!("reqlog_{tag}_{suffix}.log"))
    }

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord {
            time: "2026-10-17T09:30:00+02:00".into(),
            level,
            host: "api.example.org".into(),
            request_id: "req-9".into(),
            server_ip: "10.0.0.5".into(),
            client_ip: "203.0.113.9".into(),
            message: message.into(),
        }
    }

    #[test]
    fn destination_parses_sentinels_and_paths() {
        assert_eq!(Destination::parse("stdout"), Destination::Stdout);
        assert_eq!(Destination::parse("stderr"), Destination::Stderr);
        assert_eq!(
            Destination::parse("/var/log/app.log"),
            Destination::Path(PathBuf::from("/var/log/app.log"))
        );
        assert_eq!(Destination::Stderr.to_string(), "stderr");
    }

    #[test]
    fn json_line_decodes_back_to_record_fields() {
        let path = unique_temp_path("stream_json");
        let sink = StreamSink::new(path.clone());

        sink.write(record(LogLevel::Error, "über/straße")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        assert!(content.contains("über/straße"), "unicode and slash unescaped: {content}");

        let v: Value = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(v["time"], "2026-10-17T09:30:00+02:00");
        assert_eq!(v["level"], "error");
        assert_eq!(v["host"], "api.example.org");
        assert_eq!(v["reqid"], "req-9");
        assert_eq!(v["server_ip"], "10.0.0.5");
        assert_eq!(v["client_ip"], "203.0.113.9");
        assert_eq!(v["message"], "über/straße");
        assert_eq!(v.as_object().unwrap().len(), 7);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn path_destination_keeps_only_latest_record_by_default() {
        let path = unique_temp_path("stream_truncate");
        let sink = StreamSink::new(path.clone());

        sink.write(record(LogLevel::Info, "first")).unwrap();
        sink.write(record(LogLevel::Info, "second")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, record(LogLevel::Info, "second").to_json());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_mode_accumulates_lines() {
        let path = unique_temp_path("stream_append");
        let sink = StreamSink::new(path.clone()).with_append(true);

        sink.write(record(LogLevel::Info, "first")).unwrap();
        sink.write(record(LogLevel::Alert, "second")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"message\":\"first\""));
        assert!(lines[1].contains("\"level\":\"alert\""));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn oversized_record_is_written_completely() {
        let path = unique_temp_path("stream_large");
        let sink = StreamSink::new(path.clone());
        let rec = record(LogLevel::Debug, &"é".repeat(CHUNK_SIZE * 2));
        let expected = rec.to_json();

        sink.write(rec).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unopenable_path_is_an_io_error() {
        let missing_dir = unique_temp_path("stream_missing_dir");
        let sink = StreamSink::new(missing_dir.join("nested").join("out.log"));
        assert!(sink.write(record(LogLevel::Info, "x")).is_err());
    }

    #[test]
    fn stderr_destination_writes_successfully() {
        let sink = StreamSink::stderr();
        assert_eq!(sink.destination(), &Destination::Stderr);
        let rec = record(LogLevel::Notice, "stderr smoke test");
        sink.write(rec).unwrap();
    }

    #[test]
    fn oversized_record_to_stdout_goes_through_the_lock() {
        let sink = StreamSink::stdout();
        assert_eq!(sink.destination(), &Destination::Stdout);
        let rec = record(LogLevel::Info, &"s".repeat(CHUNK_SIZE * 2 + 1));
        assert!(rec.to_json().len() > CHUNK_SIZE);
        sink.write(rec).unwrap();
    }

    #[test]
    fn set_destination_switches_target() {
        let path = unique_temp_path("stream_switch");
        let mut sink = StreamSink::stdout();
        sink.set_destination(path.clone());
        assert_eq!(sink.destination(), &Destination::Path(path.clone()));

        sink.write(record(LogLevel::Info, "switched")).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("switched"));
        let _ = fs::remove_file(&path);
    }
}
