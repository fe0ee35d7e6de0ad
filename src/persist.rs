//! Disk I/O helpers: bootstrap, load, atomic write, advisory lock.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees.

use crate::error::{Error, ErrorCode, Result};
use crate::serializer::JsonSerializer;
use crate::value::Document;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{info, trace, warn};

const EMPTY_DOCUMENT: &[u8] = b"{}";

/// Create the file with an empty document if it doesn't exist yet. Returns
/// `true` when the file was created.
pub fn ensure_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, EMPTY_DOCUMENT)?;
    info!(path = %path.display(), "created empty document");
    Ok(true)
}

/// Reads and deserializes the file at `path`. Returns an empty document if
/// the file is missing or empty (not an error).
pub fn load(path: &Path, serializer: &JsonSerializer) -> Result<Document> {
    Ok(load_existing(path, serializer)?.unwrap_or_default())
}

/// Like [`load`] but tells a missing file apart from an empty one.
pub fn load_existing(path: &Path, serializer: &JsonSerializer) -> Result<Option<Document>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::read(path, e)),
    };
    trace!(path = %path.display(), bytes = bytes.len(), "loaded document");
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Some(Document::new()));
    }
    serializer.deserialize(&bytes).map(Some).map_err(|e| {
        if e.is(ErrorCode::FileReadError) {
            Error::read(path, e.message())
        } else {
            e
        }
    })
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    if tmp.exists() {
        warn!(path = %tmp.display(), "replacing stale temp file");
    }
    std::fs::write(&tmp, bytes).map_err(|e| Error::write(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::write(path, e)
    })
}

/// Exclusive advisory lock on `<store file>.lock`, released on drop.
///
/// Only processes that also ask for the lock are kept out; anything writing
/// the store file directly is not.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Take the lock for the store at `store_path` without blocking.
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let ext = store_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");
        let path = store_path.with_extension(format!("{ext}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::write(&path, e))?;
        file.try_lock_exclusive().map_err(|_| {
            Error::new(
                format!("{} is already in use by another store", store_path.display()),
                ErrorCode::DatabaseOperationFailed,
            )
        })?;
        trace!(path = %path.display(), "acquired store lock");
        Ok(Self { file, path })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
