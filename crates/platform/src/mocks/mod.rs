//! Mock implementations for testing
//!
//! In-memory implementations of the platform traits. Tests assert against the
//! recorded call history: per-call write lengths, enable/disable counts, and
//! the exact sample stream the output saw.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // test doubles; counters bounded by test sizes

use crate::audio::{AudioConfig, AudioOutput};
use crate::storage::{DirEntry, Storage, StorageUsage};

const FILE_CAP: usize = 8192;
const MAX_FILES: usize = 8;

/// Errors produced by [`MockStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStorageError {
    /// No file with the requested name exists.
    NotFound,
    /// An injected read failure (see [`MockStorage::fail_read_after`]).
    ReadFailed,
    /// The fixed-capacity backing store is full.
    Full,
}

struct MockFile {
    name: heapless::String<16>,
    data: heapless::Vec<u8, FILE_CAP>,
}

/// Handle to an open [`MockStorage`] file.
#[derive(Debug)]
pub struct MockFileHandle {
    index: usize,
    pos: usize,
}

/// In-memory [`Storage`] with failure injection.
#[derive(Default)]
pub struct MockStorage {
    files: heapless::Vec<MockFile, MAX_FILES>,
    reads: usize,
    /// When set, the N-th `read` call (0-based) and all later ones fail.
    pub fail_read_after: Option<usize>,
}

impl MockStorage {
    /// Create an empty mock volume.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file on the mock volume.
    ///
    /// # Panics
    ///
    /// Panics when the store or the file capacity is exceeded — a test-setup
    /// bug, not a runtime condition.
    #[allow(clippy::panic, clippy::expect_used)]
    pub fn add_file(&mut self, name: &str, data: &[u8]) {
        self.files.retain(|f| f.name.as_str() != name);
        let mut file = MockFile {
            name: heapless::String::new(),
            data: heapless::Vec::new(),
        };
        file.name.push_str(name).expect("mock file name too long");
        file.data
            .extend_from_slice(data)
            .expect("mock file data exceeds FILE_CAP");
        self.files.push(file).map_err(|_| ()).expect("mock volume full");
    }

    /// Raw contents of a stored file, if present.
    #[must_use]
    pub fn file_contents(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.name.as_str() == name)
            .map(|f| f.data.as_slice())
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;
    type FileHandle = MockFileHandle;

    async fn open(&mut self, path: &str) -> Result<MockFileHandle, MockStorageError> {
        let index = self
            .files
            .iter()
            .position(|f| f.name.as_str() == path)
            .ok_or(MockStorageError::NotFound)?;
        Ok(MockFileHandle { index, pos: 0 })
    }

    async fn read(
        &mut self,
        file: &mut MockFileHandle,
        buf: &mut [u8],
    ) -> Result<usize, MockStorageError> {
        if let Some(limit) = self.fail_read_after {
            if self.reads >= limit {
                return Err(MockStorageError::ReadFailed);
            }
        }
        self.reads += 1;
        let data = self
            .files
            .get(file.index)
            .ok_or(MockStorageError::NotFound)?
            .data
            .as_slice();
        let remaining = data.len().saturating_sub(file.pos);
        let n = remaining.min(buf.len());
        #[allow(clippy::indexing_slicing)] // n ≤ buf.len() and pos + n ≤ data.len() by construction
        buf[..n].copy_from_slice(&data[file.pos..file.pos + n]);
        file.pos += n;
        Ok(n)
    }

    async fn close(&mut self, file: MockFileHandle) -> Result<(), MockStorageError> {
        drop(file);
        Ok(())
    }

    async fn size(&mut self, file: &MockFileHandle) -> Result<u64, MockStorageError> {
        self.files
            .get(file.index)
            .map(|f| f.data.len() as u64)
            .ok_or(MockStorageError::NotFound)
    }

    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), MockStorageError> {
        self.files.retain(|f| f.name.as_str() != path);
        let mut file = MockFile {
            name: heapless::String::new(),
            data: heapless::Vec::new(),
        };
        file.name.push_str(path).map_err(|_| MockStorageError::Full)?;
        file.data
            .extend_from_slice(contents)
            .map_err(|_| MockStorageError::Full)?;
        self.files.push(file).map_err(|_| MockStorageError::Full)?;
        Ok(())
    }

    async fn list_root(&mut self, mut f: impl FnMut(&DirEntry)) -> Result<(), MockStorageError> {
        for file in &self.files {
            let mut name = heapless::String::new();
            for ch in file.name.chars() {
                if name.push(ch).is_err() {
                    break;
                }
            }
            #[allow(clippy::cast_possible_truncation)] // FILE_CAP < u32::MAX
            f(&DirEntry {
                name,
                size_bytes: file.data.len() as u32,
                is_dir: false,
            });
        }
        Ok(())
    }

    async fn usage(&mut self) -> Result<StorageUsage, MockStorageError> {
        let used_bytes = self.files.iter().map(|f| f.data.len() as u64).sum();
        Ok(StorageUsage {
            total_bytes: (MAX_FILES * FILE_CAP) as u64,
            used_bytes,
        })
    }
}

/// Errors produced by [`MockAudioOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAudioError {
    /// `configure` was called with an invalid [`AudioConfig`].
    BadConfig,
    /// `write` or `enable` was called before `configure`.
    NotConfigured,
    /// `write` was called while the channel was disabled.
    NotEnabled,
    /// An injected failure (see [`MockAudioOutput::fail_enable`]).
    Injected,
    /// The recording buffers overflowed; enlarge the test payload limits.
    Overflow,
}

/// Recording [`AudioOutput`] double.
#[derive(Default)]
pub struct MockAudioOutput {
    config: Option<AudioConfig>,
    enabled: bool,
    enable_count: usize,
    disable_count: usize,
    write_lens: heapless::Vec<usize, 1024>,
    written: heapless::Vec<i16, FILE_CAP>,
    /// When `true`, the next `enable` call fails.
    pub fail_enable: bool,
}

impl MockAudioOutput {
    /// Create a new, unconfigured mock output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-call sample counts, in call order.
    #[must_use]
    pub fn write_lens(&self) -> &[usize] {
        &self.write_lens
    }

    /// Every sample written, concatenated in order.
    #[must_use]
    pub fn written(&self) -> &[i16] {
        &self.written
    }

    /// `true` while the channel is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of `enable` calls that succeeded.
    #[must_use]
    pub fn enable_count(&self) -> usize {
        self.enable_count
    }

    /// Number of `disable` calls.
    #[must_use]
    pub fn disable_count(&self) -> usize {
        self.disable_count
    }

    /// The configuration applied via `configure`, if any.
    #[must_use]
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }
}

impl AudioOutput for MockAudioOutput {
    type Error = MockAudioError;

    async fn configure(&mut self, config: &AudioConfig) -> Result<(), MockAudioError> {
        config.validate().map_err(|_| MockAudioError::BadConfig)?;
        self.config = Some(*config);
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), MockAudioError> {
        if self.config.is_none() {
            return Err(MockAudioError::NotConfigured);
        }
        if self.fail_enable {
            return Err(MockAudioError::Injected);
        }
        if !self.enabled {
            self.enabled = true;
            self.enable_count += 1;
        }
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), MockAudioError> {
        if self.enabled {
            self.enabled = false;
            self.disable_count += 1;
        }
        Ok(())
    }

    async fn write(&mut self, samples: &[i16]) -> Result<usize, MockAudioError> {
        if self.config.is_none() {
            return Err(MockAudioError::NotConfigured);
        }
        if !self.enabled {
            return Err(MockAudioError::NotEnabled);
        }
        self.write_lens
            .push(samples.len())
            .map_err(|_| MockAudioError::Overflow)?;
        self.written
            .extend_from_slice(samples)
            .map_err(|_| MockAudioError::Overflow)?;
        Ok(samples.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_storage_read_in_chunks() {
        let mut storage = MockStorage::new();
        storage.add_file("DATA.BIN", &[1, 2, 3, 4, 5]);
        let mut file = storage.open("DATA.BIN").await.unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(storage.read(&mut file, &mut buf).await.unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(storage.read(&mut file, &mut buf).await.unwrap(), 2);
        assert_eq!(buf, [3, 4]);
        assert_eq!(storage.read(&mut file, &mut buf).await.unwrap(), 1);
        assert_eq!(storage.read(&mut file, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mock_storage_open_missing_is_not_found() {
        let mut storage = MockStorage::new();
        assert_eq!(
            storage.open("NOPE.WAV").await.unwrap_err(),
            MockStorageError::NotFound
        );
    }

    #[tokio::test]
    async fn mock_storage_injected_read_failure() {
        let mut storage = MockStorage::new();
        storage.add_file("DATA.BIN", &[0u8; 16]);
        storage.fail_read_after = Some(1);
        let mut file = storage.open("DATA.BIN").await.unwrap();
        let mut buf = [0u8; 4];
        assert!(storage.read(&mut file, &mut buf).await.is_ok());
        assert_eq!(
            storage.read(&mut file, &mut buf).await.unwrap_err(),
            MockStorageError::ReadFailed
        );
    }

    #[tokio::test]
    async fn mock_audio_records_write_lengths() {
        let mut audio = MockAudioOutput::new();
        audio.configure(&AudioConfig::default()).await.unwrap();
        audio.enable().await.unwrap();
        audio.write(&[1, 2, 3]).await.unwrap();
        audio.write(&[4]).await.unwrap();
        assert_eq!(audio.write_lens(), &[3, 1]);
        assert_eq!(audio.written(), &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn mock_audio_rejects_write_when_disabled() {
        let mut audio = MockAudioOutput::new();
        audio.configure(&AudioConfig::default()).await.unwrap();
        assert_eq!(
            audio.write(&[0]).await.unwrap_err(),
            MockAudioError::NotEnabled
        );
    }

    #[tokio::test]
    async fn mock_audio_enable_is_idempotent() {
        let mut audio = MockAudioOutput::new();
        audio.configure(&AudioConfig::default()).await.unwrap();
        audio.enable().await.unwrap();
        audio.enable().await.unwrap();
        audio.disable().await.unwrap();
        assert_eq!(audio.enable_count(), 1);
        assert_eq!(audio.disable_count(), 1);
    }
}
