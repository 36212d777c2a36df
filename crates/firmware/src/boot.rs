//! Boot policy: fixed player settings, the startup error taxonomy, and the
//! Embassy RCC configuration.
//!
//! Initialization order (MUST be respected):
//!   1. `embassy_stm32::init(build_embassy_config())` — clocks, including the
//!      SAI1 kernel clock from PLL3
//!   2. SD card mount (SPI2)
//!   3. Boot diagnostic file + root listing
//!   4. SAI1 audio output construction
//!   5. Playback, teardown, delayed system reset
//!
//! Any failure between steps 2 and 5 aborts the sequence: `run()` returns a
//! [`StartupError`] to the entry point, which logs the cause and performs the
//! same delayed reset as the success path. Nothing is retried and there is no
//! degraded mode.

use platform::audio::{AudioConfig, ConfigError};
use platform::storage::MountError;
use playback::PlayError;

/// Transfer buffer capacity in samples. One chunk of this many 16-bit
/// samples moves per read/write cycle.
pub const TRANSFER_BUFFER_SAMPLES: usize = 2048;

/// Delay between the end of the run (success or failure) and system reset.
pub const REBOOT_DELAY_MS: u64 = 3000;

/// SAI1 kernel clock produced by PLL3: 256 × 48 kHz.
///
/// See [`build_embassy_config`] for the divider chain.
pub const SAI1_KERNEL_HZ: u32 = 12_288_000;

/// Master clock to sample rate ratio required by the I²S receiver.
pub const MCLK_FS_RATIO: u32 = 256;

/// All compile-time choices of the player, gathered in one immutable value
/// so tests can substitute paths and formats without touching the transfer
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerSettings {
    /// File to play, as a FAT 8.3 short name in the volume root.
    pub wav_path: &'static str,
    /// Diagnostic file written unconditionally on every boot.
    pub boot_file: &'static str,
    /// Contents of the diagnostic file; prior content is overwritten.
    pub boot_message: &'static [u8],
    /// Output format the payload is assumed to match.
    pub audio: AudioConfig,
    /// Samples moved per transfer-loop iteration
    /// (at most [`TRANSFER_BUFFER_SAMPLES`]).
    pub buffer_samples: usize,
    /// Milliseconds to wait before the post-run system reset.
    pub reboot_delay_ms: u64,
}

impl PlayerSettings {
    /// Check the settings for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an invalid audio format, an empty or
    /// oversized path, or a transfer buffer size the static allocation cannot
    /// back.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.audio.validate().map_err(SettingsError::Audio)?;
        if self.wav_path.is_empty() || self.wav_path.len() > 12 {
            return Err(SettingsError::Path);
        }
        if self.buffer_samples == 0 || self.buffer_samples > TRANSFER_BUFFER_SAMPLES {
            return Err(SettingsError::BufferSize);
        }
        Ok(())
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            wav_path: "PIANO2.WAV",
            boot_file: "BOOT.TXT",
            boot_message: b"wav-player boot\n",
            audio: AudioConfig::default(), // 48 kHz, 16-bit, mono
            buffer_samples: TRANSFER_BUFFER_SAMPLES,
            reboot_delay_ms: REBOOT_DELAY_MS,
        }
    }
}

/// Reason a [`PlayerSettings`] value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// The audio format is outside the supported envelope.
    #[error("invalid audio format: {0}")]
    Audio(ConfigError),
    /// The WAV path is empty or not an 8.3 short name.
    #[error("invalid wav path")]
    Path,
    /// `buffer_samples` is zero or exceeds the static transfer buffer.
    #[error("invalid transfer buffer size")]
    BufferSize,
}

/// Fatal startup failures, surfaced to the entry point which owns the abort
/// policy (log, then delayed reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// The player settings failed validation.
    #[error("invalid settings: {0}")]
    Settings(SettingsError),
    /// The volume could not be mounted.
    #[error("mount failed: {0}")]
    Mount(MountError),
    /// A storage operation after mount failed (diagnostic file, listing,
    /// capacity query).
    #[error("storage i/o failed after mount")]
    Storage,
    /// The audio output rejected its configuration.
    #[error("audio output configuration failed")]
    Audio,
    /// Playback aborted.
    #[error("playback failed: {0}")]
    Playback(PlayError),
}

/// Build the `embassy_stm32::Config` with the RCC settings for the player.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz
///
/// # SAI1 kernel clock (PLL3)
///
/// HSI (64 MHz) / prediv(5) = 12.8 MHz → × mul(24) = 307.2 MHz VCO
/// PLL3_P = VCO / divp(25) = 12.288 MHz, exactly 256 × 48 000 Hz.
/// The SAI1 mux is switched from its PLL1_Q default to PLL3_P.
///
/// # DO NOT call `embassy_stm32::init(Default::default())`
///
/// `Config::default()` leaves PLL3 off and the SAI1 mux on PLL1_Q, so the
/// bit clock would be unrelated to the 48 kHz sample rate.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillators ─────────────────────────────────────────────────────────
    // HSI: 64 MHz internal oscillator (no prescaler)
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    // CSI: required for some analog peripherals on H7
    config.rcc.csi = true;

    // ── PLL1: system clock ───────────────────────────────────────────────────
    // HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz  → system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz — system clock
        divq: None,
        divr: None,
    });

    // ── PLL3: SAI1 kernel clock ──────────────────────────────────────────────
    // HSI (64 MHz) / prediv(5) = 12.8 MHz → × mul(24) = 307.2 MHz VCO
    // PLL3_P = VCO / divp(25) = 12.288 MHz = 256 × 48 kHz, exact
    config.rcc.pll3 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV5,
        mul: PllMul::MUL24,
        divp: Some(PllDiv::DIV25), // 12.288 MHz — SAI1 kernel clock
        divq: None,
        divr: None,
    });

    // ── System clock + bus prescalers ────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    // SAI1 kernel clock: PLL3_P instead of the PLL1_Q default.
    config.rcc.mux.sai1sel = mux::Saisel::PLL3_P;

    config
}
