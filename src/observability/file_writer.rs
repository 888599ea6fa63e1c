//! Rotating log file with size-based rotation and backup retention.
//!
//! [`RotatingLog`] is handed to the `fmt` layer as an `Arc<RotatingLog>`;
//! `tracing-subscriber` treats any `Arc<W>` whose `&W` is [`io::Write`] as a
//! writer factory, so every event goes through the same locked file handle.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Size above which the log is rotated (10 MB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Rotated files kept next to the live log.
const MAX_BACKUP_FILES: usize = 3;

/// Append-only log file that rotates itself.
///
/// When the live file grows past the size limit it is renamed to
/// `<name>.<unix_timestamp>` and a fresh file is started. Only the newest
/// backups are kept.
pub struct RotatingLog {
    path: PathBuf,
    max_bytes: u64,
    /// Opened on first write.
    file: Mutex<Option<File>>,
}

impl RotatingLog {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limit(path, MAX_FILE_SIZE_BYTES)
    }

    /// Same as [`Self::new`] with a custom rotation threshold.
    #[must_use]
    pub const fn with_limit(path: PathBuf, max_bytes: u64) -> Self {
        Self {
            path,
            max_bytes,
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, buf: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        let too_big = fs::metadata(&self.path).is_ok_and(|m| m.len() > self.max_bytes);
        if too_big {
            *file = None;
            self.rotate()?;
        }

        let handle = match file.take() {
            Some(handle) => handle,
            None => OpenOptions::new().create(true).append(true).open(&self.path)?,
        };
        let handle = file.insert(handle);
        handle.write_all(buf)?;
        handle.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();

        let mut backup = self.path.clone().into_os_string();
        backup.push(format!(".{stamp}"));
        if self.path.exists() {
            fs::rename(&self.path, PathBuf::from(backup))?;
        }

        self.prune_backups()
    }

    /// Deletes all but the newest backups. Individual delete failures are ignored.
    fn prune_backups(&self) -> io::Result<()> {
        let (Some(dir), Some(name)) = (self.path.parent(), self.path.file_name().and_then(|n| n.to_str())) else {
            return Ok(());
        };
        let prefix = format!("{name}.");

        let mut backups: Vec<(PathBuf, Option<SystemTime>)> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_str().is_some_and(|n| n.starts_with(&prefix)))
            .map(|entry| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok();
                (entry.path(), modified)
            })
            .collect();

        backups.sort_by(|a, b| b.1.cmp(&a.1));
        for (old, _) in backups.iter().skip(MAX_BACKUP_FILES) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

impl Write for &RotatingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for RotatingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLog")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backups(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("fesnuk.log."))
            .count()
    }

    #[test]
    fn appends_lines() {
        let dir = TempDir::new().unwrap();
        let log = RotatingLog::new(dir.path().join("fesnuk.log"));
        (&log).write_all(b"one\n").unwrap();
        (&log).write_all(b"two\n").unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn oversized_file_is_rotated() {
        let dir = TempDir::new().unwrap();
        let log = RotatingLog::with_limit(dir.path().join("fesnuk.log"), 8);
        (&log).write_all(b"0123456789\n").unwrap();
        (&log).write_all(b"fresh\n").unwrap();

        assert_eq!(fs::read_to_string(log.path()).unwrap(), "fresh\n");
        assert_eq!(backups(dir.path()), 1);
    }
}
