use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use crate::log::{
    locked_append::append, log_level::LogLevel, log_record::LogRecord, log_sink::LogSink,
};

/// Mode for a save directory created by the sink. World-writable so that
/// co-operating processes running as other users can add their own level files.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Mode applied to a level file after its first successful write.
pub const DEFAULT_FILE_MODE: u32 = 0o666;

/// Appends one space-joined line per record to `<save_path>/<level>.log`.
///
/// The directory tree is created on demand. Each write opens the level file in
/// append mode, writes through the chunk+lock protocol and closes it again.
///
/// The default modes trade isolation for convenience: anyone on the host can
/// read and append to the logs. Use [`FileSink::with_modes`] to tighten them.
/// Modes only take effect on unix.
#[derive(Debug, Clone)]
pub struct FileSink {
    save_path: PathBuf,
    dir_mode: u32,
    file_mode: u32,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(save_path: P) -> Self {
        Self {
            save_path: save_path.as_ref().to_path_buf(),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
        }
    }

    /// Overrides the permission bits used when bootstrapping the directory and files.
    #[must_use]
    pub fn with_modes(mut self, dir_mode: u32, file_mode: u32) -> Self {
        self.dir_mode = dir_mode;
        self.file_mode = file_mode;
        self
    }

    pub fn set_save_path<P: AsRef<Path>>(&mut self, save_path: P) {
        self.save_path = save_path.as_ref().to_path_buf();
    }

    #[must_use]
    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Path of the file that receives records of `level`.
    #[must_use]
    pub fn level_path(&self, level: LogLevel) -> PathBuf {
        self.save_path.join(format!("{}.log", level.as_str()))
    }

    fn ensure_dir(&self) -> io::Result<()> {
        if self.save_path.is_dir() {
            return Ok(());
        }
        create_dir(&self.save_path, self.dir_mode)
    }
}

impl LogSink for FileSink {
    fn write(&self, record: LogRecord) -> io::Result<()> {
        self.ensure_dir()?;

        let path = self.level_path(record.level);
        let (mut file, created) = open_append(&path, self.file_mode)?;
        append(&mut file, record.to_line().as_bytes())?;
        drop(file);

        if created {
            set_mode(&path, self.file_mode)?;
        }
        Ok(())
    }
}

/// Opens `path` for appending and reports whether this call created it.
fn open_append(path: &Path, mode: u32) -> io::Result<(File, bool)> {
    let mut opts = OpenOptions::new();
    opts.append(true);
    with_create_mode(&mut opts, mode);

    match opts.clone().create_new(true).open(path) {
        Ok(file) => Ok((file, true)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok((opts.open(path)?, false)),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn with_create_mode(opts: &mut OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    opts.mode(mode);
}

#[cfg(not(unix))]
fn with_create_mode(_opts: &mut OpenOptions, _mode: u32) {}

/// Creates `dir` and any missing parents. Only a leaf created by this call gets
/// its mode applied; one that another process created first is left untouched.
#[cfg(unix)]
fn create_dir(dir: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::DirBuilder::new().recursive(true).mode(mode).create(parent)?;
    }
    match fs::DirBuilder::new().mode(mode).create(dir) {
        // The umask has narrowed the requested mode; apply it explicitly.
        Ok(()) => set_mode(dir, mode),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn create_dir(dir: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
