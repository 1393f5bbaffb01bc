//! Backing stores for pool images.
//!
//! A [`PoolStore`] persists whole images. The only durability contract is
//! that [`PoolStore::store`] is atomic: after a crash, `load` returns either
//! the previous image or the new one, never a mix.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::error::PoolError;

/// Durable home of a pool image.
pub trait PoolStore: Send {
    /// Read the current image, or `None` if no pool has been created.
    fn load(&mut self) -> Result<Option<Vec<u8>>, PoolError>;

    /// Atomically replace the current image.
    fn store(&mut self, image: &[u8]) -> Result<(), PoolError>;

    /// Whether an image exists.
    fn exists(&self) -> bool;
}

impl<S: PoolStore + ?Sized> PoolStore for Box<S> {
    fn load(&mut self) -> Result<Option<Vec<u8>>, PoolError> {
        (**self).load()
    }

    fn store(&mut self, image: &[u8]) -> Result<(), PoolError> {
        (**self).store(image)
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }
}

// ── FileStore ───────────────────────────────────────────────────

/// Stores the image in a single file, replaced by write-then-rename.
///
/// `store` writes `<path>.tmp`, syncs it, renames it over `<path>` and then
/// syncs the parent directory. A crash before the rename leaves the old
/// file in place; a stale `.tmp` is simply overwritten by the next commit.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the pool file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The pool file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temporary file used while committing.
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn sync_parent_dir(&self) {
        let Some(parent) = self.path.parent() else {
            return;
        };
        let dir = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        // Directory fsync is not supported everywhere; the rename already
        // happened, so a failure here only weakens durability, not atomicity.
        if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
            debug!(dir = %dir.display(), error = %e, "directory sync skipped");
        }
    }
}

impl PoolStore for FileStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, PoolError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                trace!(path = %self.path.display(), len = bytes.len(), "loaded pool image");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, image: &[u8]) -> Result<(), PoolError> {
        let tmp = self.tmp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(image)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.sync_parent_dir();
        trace!(path = %self.path.display(), len = image.len(), "stored pool image");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

// ── MemStore ────────────────────────────────────────────────────

/// In-memory store.
///
/// Clones share the same image, so a test can keep one clone, drop the
/// pool, and reopen from the clone to observe what was "on disk".
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    image: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current image.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.lock().clone()
    }

    /// Overwrite the image directly, bypassing the pool.
    pub fn replace(&self, image: Option<Vec<u8>>) {
        *self.lock() = image;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        self.image.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PoolStore for MemStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, PoolError> {
        Ok(self.snapshot())
    }

    fn store(&mut self, image: &[u8]) -> Result<(), PoolError> {
        *self.lock() = Some(image.to_vec());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_clones_share_image() {
        let mut a = MemStore::new();
        let b = a.clone();
        assert!(!b.exists());
        a.store(b"image").unwrap();
        assert!(b.exists());
        assert_eq!(b.snapshot().as_deref(), Some(&b"image"[..]));
    }

    #[test]
    fn file_store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("pool"));
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_replaces_and_cleans_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("pool"));
        store.store(b"one").unwrap();
        store.store(b"two").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(&b"two"[..]));
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn stale_tmp_is_ignored_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("pool"));
        store.store(b"committed").unwrap();
        fs::write(store.tmp_path(), b"half-written").unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some(&b"committed"[..]));
        store.store(b"next").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(&b"next"[..]));
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let store = FileStore::new("/tmp/arrays.pool");
        assert_eq!(store.tmp_path(), PathBuf::from("/tmp/arrays.pool.tmp"));
    }
}
