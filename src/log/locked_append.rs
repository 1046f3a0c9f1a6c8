//! Append protocol shared by the sinks.
//!
//! Payloads up to [`CHUNK_SIZE`] bytes go out in a single write. Larger ones are
//! split into `CHUNK_SIZE` pieces written under an exclusive advisory lock, so
//! two processes appending oversized records never interleave their chunks.
//! Whole small records from different writers may still interleave with each
//! other at record granularity.

use std::io::{self, Write};

/// Largest payload written without taking the lock, and the chunk size above it.
pub const CHUNK_SIZE: usize = 1024;

/// Exclusive advisory locking over a write destination.
///
/// On unix this is `flock(2)`, which is shared by every handle that came from the
/// same open call and is released by the kernel when the last one closes.
pub trait Lockable {
    fn lock_exclusive(&self) -> io::Result<()>;
    fn unlock(&self) -> io::Result<()>;
}

/// Writes `payload` following the chunk+lock protocol with the default chunk size.
///
/// # Errors
/// Returns the first lock, write or flush error. A chunk failure aborts the
/// remaining chunks; bytes already written stay in place. The lock is released
/// on every path once it was taken.
pub fn append<W: Write + Lockable + ?Sized>(w: &mut W, payload: &[u8]) -> io::Result<()> {
    append_chunked(w, payload, CHUNK_SIZE)
}

/// Same as [`append`] with an explicit chunk size (clamped to at least 1).
///
/// # Errors
/// See [`append`].
pub fn append_chunked<W: Write + Lockable + ?Sized>(
    w: &mut W,
    payload: &[u8],
    chunk_size: usize,
) -> io::Result<()> {
    let chunk_size = chunk_size.max(1);

    if payload.len() <= chunk_size {
        w.write_all(payload)?;
        return w.flush();
    }

    w.lock_exclusive()?;
    let written = write_chunks(w, payload, chunk_size);
    let released = w.unlock();
    // A write failure takes precedence over an unlock failure.
    written.and(released)
}

fn write_chunks<W: Write + ?Sized>(w: &mut W, payload: &[u8], chunk_size: usize) -> io::Result<()> {
    for chunk in payload.chunks(chunk_size) {
        w.write_all(chunk)?;
    }
    w.flush()
}

#[cfg(unix)]
mod imp {
    use super::Lockable;
    use std::{
        fs::File,
        io::{self, StderrLock, StdoutLock},
        os::unix::io::{AsRawFd, RawFd},
    };

    fn flock(fd: RawFd, op: libc::c_int) -> io::Result<()> {
        loop {
            // SAFETY: `fd` is borrowed from a live handle for the duration of the call.
            let rc = unsafe { libc::flock(fd, op) };
            if rc == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    macro_rules! impl_lockable_fd {
        ($($ty:ty),* $(,)?) => {$(
            impl Lockable for $ty {
                fn lock_exclusive(&self) -> io::Result<()> {
                    flock(self.as_raw_fd(), libc::LOCK_EX)
                }

                fn unlock(&self) -> io::Result<()> {
                    flock(self.as_raw_fd(), libc::LOCK_UN)
                }
            }
        )*};
    }

    impl_lockable_fd!(File, StdoutLock<'_>, StderrLock<'_>);
}

#[cfg(not(unix))]
mod imp {
    use super::Lockable;
    use std::{
        fs::File,
        io::{self, StderrLock, StdoutLock},
    };

    // No advisory locking here; in-process exclusion still comes from the std locks.
    macro_rules! impl_lockable_noop {
        ($($ty:ty),* $(,)?) => {$(
            impl Lockable for $ty {
                fn lock_exclusive(&self) -> io::Result<()> {
                    Ok(())
                }

                fn unlock(&self) -> io::Result<()> {
                    Ok(())
                }
            }
        )*};
    }

    impl_lockable_noop!(File, StdoutLock<'_>, StderrLock<'_>);
}
