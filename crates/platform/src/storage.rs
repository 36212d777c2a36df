//! Storage abstraction for the flash-backed file store.
//!
//! The trait is deliberately provider-centric: every operation routes through
//! the storage object and files are opaque handle tokens. This matches FAT
//! volume managers (`embedded-sdmmc`), where the volume owns all file state
//! and a file object cannot outlive or bypass it.

use heapless::String;

/// Maximum directory-entry name length (FAT 8.3 short name: 8 + dot + 3).
pub const MAX_NAME_LEN: usize = 12;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirEntry {
    /// Entry name (8.3 short name on FAT volumes).
    pub name: String<MAX_NAME_LEN>,
    /// File size in bytes; zero for directories.
    pub size_bytes: u32,
    /// `true` when the entry is a subdirectory.
    pub is_dir: bool,
}

/// Total and used capacity of a mounted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageUsage {
    /// Volume capacity in bytes.
    pub total_bytes: u64,
    /// Bytes currently accounted to files.
    pub used_bytes: u64,
}

/// Why a volume failed to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountError {
    /// The storage device did not come up (card missing, bus fault).
    #[error("storage device initialisation failed")]
    DeviceInit,
    /// The device responded but carries no recognisable volume.
    #[error("volume not found")]
    VolumeNotFound,
    /// Any other I/O failure during the mount sequence.
    #[error("i/o error while mounting")]
    Io,
}

/// File-store access trait.
///
/// Files are opaque tokens of type [`Storage::FileHandle`]; the caller is
/// responsible for passing a handle back to [`close`] exactly once. Reads
/// advance an internal per-file position.
///
/// [`close`]: Storage::close
pub trait Storage {
    /// Error type.
    type Error: core::fmt::Debug;
    /// Opaque open-file token.
    type FileHandle;

    /// Open a file for reading.
    fn open(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::FileHandle, Self::Error>>;

    /// Read from the file's current position; returns bytes read (0 = EOF).
    fn read(
        &mut self,
        file: &mut Self::FileHandle,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Close an open file, releasing its handle.
    fn close(
        &mut self,
        file: Self::FileHandle,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// File length in bytes.
    fn size(
        &mut self,
        file: &Self::FileHandle,
    ) -> impl core::future::Future<Output = Result<u64, Self::Error>>;

    /// Create or truncate `path` and write `contents` to it.
    fn write_file(
        &mut self,
        path: &str,
        contents: &[u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Call `f` once per entry in the root directory.
    fn list_root(
        &mut self,
        f: impl FnMut(&DirEntry),
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Report total and used capacity.
    fn usage(
        &mut self,
    ) -> impl core::future::Future<Output = Result<StorageUsage, Self::Error>>;
}
