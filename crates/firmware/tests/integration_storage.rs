//! Storage-backend integration tests — mount error taxonomy against stub
//! block devices.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//!
//! Run with: cargo test -p firmware --test integration_storage

use embedded_sdmmc::{Block, BlockCount, BlockDevice, BlockIdx};
use firmware::storage::{mount, FixedTime};
use platform::storage::MountError;

/// A block device whose medium never responds.
#[derive(Debug)]
struct DeadDevice;

impl BlockDevice for DeadDevice {
    type Error = ();

    fn read(
        &self,
        _blocks: &mut [Block],
        _start_block_idx: BlockIdx,
        _reason: &str,
    ) -> Result<(), ()> {
        Err(())
    }

    fn write(&self, _blocks: &[Block], _start_block_idx: BlockIdx) -> Result<(), ()> {
        Err(())
    }

    fn num_blocks(&self) -> Result<BlockCount, ()> {
        Err(())
    }
}

/// A device that reports a size but returns all-zero sectors: no MBR, no
/// BIOS parameter block, nothing resembling a volume.
#[derive(Debug)]
struct BlankDevice;

impl BlockDevice for BlankDevice {
    type Error = ();

    fn read(
        &self,
        blocks: &mut [Block],
        _start_block_idx: BlockIdx,
        _reason: &str,
    ) -> Result<(), ()> {
        for block in blocks.iter_mut() {
            block.contents.fill(0);
        }
        Ok(())
    }

    fn write(&self, _blocks: &[Block], _start_block_idx: BlockIdx) -> Result<(), ()> {
        Ok(())
    }

    fn num_blocks(&self) -> Result<BlockCount, ()> {
        Ok(BlockCount(2048))
    }
}

/// A dead medium maps to the device-init mount failure.
#[test]
fn dead_device_reports_device_init() {
    assert_eq!(
        mount(DeadDevice, FixedTime).unwrap_err(),
        MountError::DeviceInit
    );
}

/// A readable device with no volume on it maps to volume-not-found.
#[test]
fn blank_device_reports_volume_not_found() {
    assert_eq!(
        mount(BlankDevice, FixedTime).unwrap_err(),
        MountError::VolumeNotFound
    );
}

/// The fixed time source stamps files in 2025.
#[test]
fn fixed_time_is_constant() {
    use embedded_sdmmc::TimeSource;
    let a = FixedTime.get_timestamp();
    let b = FixedTime.get_timestamp();
    assert_eq!(a, b);
    assert_eq!(a.year_since_1970, 55);
}
