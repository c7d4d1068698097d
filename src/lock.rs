//! File locking and atomic writes for the task store
//!
//! - Advisory exclusive locks (fs2/flock) on a sidecar `<blob>.lock` file
//! - Lock timeout with a fixed retry interval
//! - Atomic blob replacement (temp file in the same directory + rename)
//!
//! Every repository mutation holds the lock across its read-modify-write so
//! two open views of the same store never lose each other's updates.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Default retry interval when waiting for a lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // Windows reports sharing/lock violations as raw OS errors 32/33.
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

/// A file lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on a file with timeout
    ///
    /// The lock file is created if it doesn't exist.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let file = open_lock_file(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        tracing::warn!(path = %path.display(), timeout_ms, "store lock timed out");
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => {
                    return Err(Error::Io(e));
                }
            }
        }
    }

    /// Get the path to the locked file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Atomically replace a file's contents
///
/// Writes to a temp file in the target's directory, syncs it, then renames
/// it over the target. Does NOT take a lock.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| Error::Io(err.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_file_lock_acquire_release() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("tasks.json.lock");

        let lock = FileLock::acquire(&lock_path, 1000).unwrap();
        assert!(lock_path.exists());
        assert_eq!(lock.path(), lock_path.as_path());

        let contended = FileLock::acquire(&lock_path, 50);
        assert!(matches!(contended, Err(Error::LockFailed(_))));

        drop(lock);

        let lock2 = FileLock::acquire(&lock_path, 50).unwrap();
        assert_eq!(lock2.path(), lock_path.as_path());
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("tasks.json");

        write_atomic(&file_path, b"[]").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "[]");

        write_atomic(&file_path, b"[{}]").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "[{}]");

        // No temp files left behind.
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn timeout_returns_lock_failed() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("timeout.lock");

        let _lock = FileLock::acquire(&lock_path, 1000).unwrap();
        let result = FileLock::acquire(&lock_path, 50);
        assert!(matches!(result, Err(Error::LockFailed(_))));
    }

    #[test]
    fn stress_single_lock_holder() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("stress.lock");

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let in_lock = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(threads);
        for _ in 0..threads {
            let barrier = Arc::clone(&barrier);
            let in_lock = Arc::clone(&in_lock);
            let max_concurrent = Arc::clone(&max_concurrent);
            let lock_path = lock_path.clone();

            handles.push(thread::spawn(move || {
                barrier.wait();
                let _lock = FileLock::acquire(&lock_path, 5000).unwrap();

                let current = in_lock.fetch_add(1, Ordering::SeqCst) + 1;
                let _ = max_concurrent.fetch_max(current, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                in_lock.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }
}
