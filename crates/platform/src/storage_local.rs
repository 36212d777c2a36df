//! Local filesystem Storage implementation for host development.
//!
//! `LocalFileStorage` implements [`Storage`] using `std::fs`. Used when the
//! `std` feature is enabled (host builds only). All paths are resolved
//! relative to the root directory provided at construction.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::storage::{DirEntry, Storage, StorageUsage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

/// A [`Storage`] implementation backed by `std::fs`.
///
/// Paths are resolved relative to the root directory given to
/// [`LocalFileStorage::new`].
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `root`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type FileHandle = LocalFile;

    async fn open(&mut self, path: &str) -> Result<LocalFile, LocalStorageError> {
        let file = fs::File::open(self.resolve(path)).map_err(LocalStorageError)?;
        let size = file.metadata().map_err(LocalStorageError)?.len();
        Ok(LocalFile { inner: file, size })
    }

    async fn read(
        &mut self,
        file: &mut LocalFile,
        buf: &mut [u8],
    ) -> Result<usize, LocalStorageError> {
        Read::read(&mut file.inner, buf).map_err(LocalStorageError)
    }

    async fn close(&mut self, file: LocalFile) -> Result<(), LocalStorageError> {
        drop(file);
        Ok(())
    }

    async fn size(&mut self, file: &LocalFile) -> Result<u64, LocalStorageError> {
        Ok(file.size)
    }

    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), LocalStorageError> {
        let mut file = fs::File::create(self.resolve(path)).map_err(LocalStorageError)?;
        file.write_all(contents).map_err(LocalStorageError)
    }

    async fn list_root(&mut self, mut f: impl FnMut(&DirEntry)) -> Result<(), LocalStorageError> {
        for entry in fs::read_dir(&self.root).map_err(LocalStorageError)? {
            let entry = entry.map_err(LocalStorageError)?;
            let meta = entry.metadata().map_err(LocalStorageError)?;
            let mut name = heapless::String::new();
            // Names longer than a FAT short name are truncated in the listing.
            for ch in entry.file_name().to_string_lossy().chars() {
                if name.push(ch).is_err() {
                    break;
                }
            }
            #[allow(clippy::cast_possible_truncation)] // listing is diagnostic only
            let size_bytes = meta.len() as u32;
            f(&DirEntry {
                name,
                size_bytes,
                is_dir: meta.is_dir(),
            });
        }
        Ok(())
    }

    async fn usage(&mut self) -> Result<StorageUsage, LocalStorageError> {
        let mut used_bytes = 0u64;
        for entry in fs::read_dir(&self.root).map_err(LocalStorageError)? {
            let entry = entry.map_err(LocalStorageError)?;
            let meta = entry.metadata().map_err(LocalStorageError)?;
            if meta.is_file() {
                used_bytes = used_bytes.saturating_add(meta.len());
            }
        }
        // The host filesystem has no meaningful fixed capacity; report used
        // twice over so total ≥ used always holds.
        Ok(StorageUsage {
            total_bytes: used_bytes.saturating_mul(2),
            used_bytes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_storage_read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.bin"), b"hello world").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open("test.bin").await.unwrap();
        let mut buf = [0u8; 11];
        let n = storage.read(&mut file, &mut buf).await.unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
        storage.close(file).await.unwrap();
    }

    #[tokio::test]
    async fn local_storage_size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.bin"), [0u8; 64]).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let file = storage.open("size.bin").await.unwrap();
        assert_eq!(storage.size(&file).await.unwrap(), 64);
    }

    #[tokio::test]
    async fn local_storage_open_missing_fails() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        assert!(storage.open("missing.bin").await.is_err());
    }

    #[tokio::test]
    async fn local_storage_write_file_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        storage.write_file("boot.txt", b"first").await.unwrap();
        storage.write_file("boot.txt", b"second").await.unwrap();
        assert_eq!(fs::read(tmp.path().join("boot.txt")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn local_storage_lists_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.wav"), b"xx").unwrap();
        fs::write(tmp.path().join("b.txt"), b"yyy").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut names = Vec::new();
        storage
            .list_root(|e| names.push(e.name.clone()))
            .await
            .unwrap();
        names.sort();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].as_str(), "a.wav");
        assert_eq!(names[1].as_str(), "b.txt");
    }

    #[tokio::test]
    async fn local_storage_usage_counts_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), [0u8; 10]).unwrap();
        fs::write(tmp.path().join("b.bin"), [0u8; 30]).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let usage = storage.usage().await.unwrap();
        assert_eq!(usage.used_bytes, 40);
        assert!(usage.total_bytes >= usage.used_bytes);
    }
}
