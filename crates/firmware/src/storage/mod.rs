//! FAT volume storage backend over `embedded-sdmmc`.
//!
//! [`VolumeStorage`] adapts an `embedded-sdmmc` volume to the
//! [`platform::Storage`] trait. It is generic over the block device, so the
//! same adapter serves the SPI SD card on hardware and any other
//! `BlockDevice`. The raw handle API is used throughout: every file and
//! directory operation routes through the [`VolumeManager`], which owns all
//! FAT state.
//!
//! [`platform::Storage`]: platform::storage::Storage

use embedded_sdmmc::{
    BlockDevice, Mode, RawDirectory, RawFile, RawVolume, TimeSource, Timestamp, VolumeIdx,
    VolumeManager,
};
use platform::storage::{DirEntry, MountError, Storage, StorageUsage};

/// Fixed timestamp source: the volume is read-mostly and the board carries
/// no RTC. New files are stamped 2025-01-01.
#[derive(Debug)]
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 55,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// Bytes per FAT sector/block.
const BLOCK_BYTES: u64 = 512;

/// A mounted FAT volume with its root directory held open.
#[derive(Debug)]
pub struct VolumeStorage<D: BlockDevice, T: TimeSource> {
    mgr: VolumeManager<D, T>,
    #[allow(dead_code)] // held so the volume stays open for the root handle
    volume: RawVolume,
    root: RawDirectory,
    total_bytes: u64,
}

/// Mount volume 0 of `device` and open its root directory.
///
/// # Errors
///
/// Maps the underlying failures onto the [`MountError`] taxonomy:
/// device-level errors to [`MountError::DeviceInit`], a missing or
/// unrecognisable volume to [`MountError::VolumeNotFound`], anything else to
/// [`MountError::Io`].
pub fn mount<D: BlockDevice, T: TimeSource>(
    device: D,
    time: T,
) -> Result<VolumeStorage<D, T>, MountError> {
    let mut mgr = VolumeManager::new(device, time);

    let total_bytes = match mgr.device().num_blocks() {
        Ok(blocks) => u64::from(blocks.0).saturating_mul(BLOCK_BYTES),
        Err(_) => return Err(MountError::DeviceInit),
    };

    let volume = mgr.open_raw_volume(VolumeIdx(0)).map_err(|e| match e {
        embedded_sdmmc::Error::NoSuchVolume | embedded_sdmmc::Error::FormatError(_) => {
            MountError::VolumeNotFound
        }
        embedded_sdmmc::Error::DeviceError(_) => MountError::DeviceInit,
        _ => MountError::Io,
    })?;
    let root = mgr.open_root_dir(volume).map_err(|_| MountError::Io)?;

    Ok(VolumeStorage {
        mgr,
        volume,
        root,
        total_bytes,
    })
}

fn convert(entry: &embedded_sdmmc::DirEntry) -> DirEntry {
    let mut name = heapless::String::new();
    // An 8.3 short name always fits MAX_NAME_LEN; a format failure leaves
    // the name truncated, which is acceptable for a diagnostic listing.
    let _ = core::fmt::write(&mut name, format_args!("{}", entry.name));
    DirEntry {
        name,
        size_bytes: entry.size,
        is_dir: entry.attributes.is_directory(),
    }
}

impl<D: BlockDevice, T: TimeSource> Storage for VolumeStorage<D, T> {
    type Error = embedded_sdmmc::Error<D::Error>;
    type FileHandle = RawFile;

    async fn open(&mut self, path: &str) -> Result<RawFile, Self::Error> {
        self.mgr.open_file_in_dir(self.root, path, Mode::ReadOnly)
    }

    async fn read(&mut self, file: &mut RawFile, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.mgr.read(*file, buf) {
            Ok(n) => Ok(n),
            Err(embedded_sdmmc::Error::EndOfFile) => Ok(0),
            Err(e) => Err(e),
        }
    }

    async fn close(&mut self, file: RawFile) -> Result<(), Self::Error> {
        self.mgr.close_file(file)
    }

    async fn size(&mut self, file: &RawFile) -> Result<u64, Self::Error> {
        self.mgr.file_length(*file).map(u64::from)
    }

    async fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<(), Self::Error> {
        let file = self
            .mgr
            .open_file_in_dir(self.root, path, Mode::ReadWriteCreateOrTruncate)?;
        let written = self.mgr.write(file, contents);
        let closed = self.mgr.close_file(file);
        written?;
        closed
    }

    async fn list_root(&mut self, mut f: impl FnMut(&DirEntry)) -> Result<(), Self::Error> {
        self.mgr.iterate_dir(self.root, |entry| f(&convert(entry)))
    }

    async fn usage(&mut self) -> Result<StorageUsage, Self::Error> {
        // Used capacity is the sum of root-entry sizes: a diagnostic figure,
        // not FAT free-cluster accounting.
        let mut used_bytes = 0u64;
        self.mgr.iterate_dir(self.root, |entry| {
            if !entry.attributes.is_directory() {
                used_bytes = used_bytes.saturating_add(u64::from(entry.size));
            }
        })?;
        Ok(StorageUsage {
            total_bytes: self.total_bytes,
            used_bytes,
        })
    }
}

#[cfg(feature = "hardware")]
pub use hardware::mount_sd;

#[cfg(feature = "hardware")]
mod hardware {
    use embassy_time::Delay;
    use embedded_hal::digital::OutputPin;
    use embedded_hal::spi::SpiBus;
    use embedded_hal_bus::spi::ExclusiveDevice;
    use embedded_sdmmc::SdCard;
    use platform::storage::MountError;

    use super::{mount, FixedTime, VolumeStorage};

    /// Mount the FAT volume on an SPI-attached SD card.
    ///
    /// The bus clock must be in the 100–400 kHz window the card
    /// initialisation sequence requires; the caller configures it.
    pub fn mount_sd<SPI, CS>(
        spi: SPI,
        cs: CS,
    ) -> Result<VolumeStorage<SdCard<ExclusiveDevice<SPI, CS, Delay>, Delay>, FixedTime>, MountError>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
    {
        let spi_device =
            ExclusiveDevice::new(spi, cs, Delay).map_err(|_| MountError::DeviceInit)?;
        let card = SdCard::new(spi_device, Delay);
        mount(card, FixedTime)
    }
}
