//! Atomic file persistence and cleanup helpers.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fxarchive_types::{ArchiveError, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes `bytes` to `path` atomically, refusing to replace an existing file.
///
/// The data goes to a temporary file in the target directory which is then
/// renamed into place, so readers never observe a partial file.
///
/// # Errors
///
/// Returns [`ArchiveError::PersistConflict`] if `path` already exists and
/// [`ArchiveError::Io`] on any filesystem failure.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = staged(path, bytes)?;
    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            ArchiveError::PersistConflict {
                path: path.to_path_buf(),
            }
        } else {
            ArchiveError::Io(e.error)
        }
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "persisted");
    Ok(())
}

/// Writes `bytes` to `path` atomically, replacing an existing file.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] on any filesystem failure.
pub fn atomic_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = staged(path, bytes)?;
    tmp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "persisted");
    Ok(())
}

fn staged(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .ok_or_else(|| ArchiveError::argument(format!("'{}' has no parent", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Creates an empty marker file, returning true if it did not exist yet.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] if the file or its directory cannot be created.
pub fn touch_marker(path: &Path) -> Result<bool> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Deletes a file, returning true if it existed.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] on failures other than a missing file.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "deleted");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Removes a directory if it exists and is empty, returning true if removed.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] on failures other than a missing or
/// non-empty directory.
pub fn remove_dir_if_empty(path: &Path) -> Result<bool> {
    let mut entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if entries.next().is_some() {
        return Ok(false);
    }
    match fs::remove_dir(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed empty directory");
            Ok(true)
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/00h_ticks.bin");

        atomic_write(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        // no temporary file left behind
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_write_conflict() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("00h_ticks.bin");

        atomic_write(&path, b"first").unwrap();
        let result = atomic_write(&path, b"second");
        assert!(matches!(result, Err(ArchiveError::PersistConflict { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_atomic_replace_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("00h_ticks.bi5");

        atomic_replace(&path, b"first").unwrap();
        atomic_replace(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_touch_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x/00h_ticks.404");

        assert!(touch_marker(&path).unwrap());
        assert!(!touch_marker(&path).unwrap());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_remove_helpers() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("day");
        let file = sub.join("00h_ticks.na");
        touch_marker(&file).unwrap();

        assert!(!remove_dir_if_empty(&sub).unwrap());
        assert!(remove_file_if_exists(&file).unwrap());
        assert!(!remove_file_if_exists(&file).unwrap());
        assert!(remove_dir_if_empty(&sub).unwrap());
        assert!(!remove_dir_if_empty(&sub).unwrap());
    }
}
