//! Hardware Abstraction Layer (HAL) for the WAV playback firmware.
//!
//! This crate provides trait-based abstractions for the two hardware
//! boundaries the player touches, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Playback pipeline (playback crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + embedded-sdmmc)
//! ```
//!
//! # Abstractions
//!
//! - [`Storage`] - File store access (open/read/close, listing, capacity)
//! - [`AudioOutput`] - One playback direction of a hardware audio interface
//!
//! # Features
//!
//! - `std`: Enable standard library support ([`storage_local`], [`mocks`])
//! - `defmt`: Enable defmt logging derives on platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this HAL crate:
#![allow(clippy::missing_panics_doc)] // statically-valid expect() with safety comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
#[cfg(any(test, feature = "std"))]
pub mod mocks;
pub mod storage;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{AudioConfig, AudioOutput, ChannelLayout, ConfigError};
pub use storage::{DirEntry, MountError, Storage, StorageUsage};
