//! WAV playback firmware for STM32H743ZI.
//!
//! Mounts a FAT volume from an SPI SD card, writes a boot diagnostic file,
//! lists the volume root, streams one fixed WAV file to the SAI1 audio
//! output, then reboots after a fixed delay.
//!
//! # Architecture
//!
//! ```text
//! Application (main.rs: boot sequence + abort policy)
//!         ↓
//! Playback pipeline (playback crate: header + transfer loop)
//!         ↓
//! Platform HAL traits (platform crate)
//!         ↓
//! Backends (this crate: embedded-sdmmc volume, SAI1 output)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32H7 target (Embassy, SAI, SPI SD card).
//!   Without it the crate's library (settings, storage adapter) still
//!   compiles and tests on the host.
//!
//! # Building
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

#[cfg(feature = "hardware")]
pub mod audio;
pub mod boot;
pub mod storage;

// Re-export key types
pub use boot::{PlayerSettings, SettingsError, StartupError};
pub use storage::{mount, FixedTime, VolumeStorage};

#[cfg(feature = "hardware")]
pub use audio::{sai_config, AudioError, SaiAudioOut};

#[cfg(feature = "hardware")]
pub use storage::mount_sd;
