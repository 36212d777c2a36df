//! SAI1 audio output backend.
//!
//! # Hardware: SAI1 Block A (master transmitter), 16-bit I²S
//!
//! ## Pin assignments (STM32H743ZI, SAI1 Block A, AF6)
//!
//! | Function     | Pin |
//! |--------------|-----|
//! | SAI1_MCLK_A  | PE2 |
//! | SAI1_FS_A    | PE4 |
//! | SAI1_SCK_A   | PE5 |
//! | SAI1_SD_A    | PE6 |
//!
//! ## DMA
//!
//! DMA1 Stream 0 in circular mode feeds the SAI FIFO from a ring buffer in
//! AXI SRAM. DTCM (`0x2000_0000`) is NOT accessible by DMA1 — the buffer must
//! carry `#[link_section = ".axisram"]`.
//!
//! The format and pin assignment are fixed at driver construction; the
//! runtime [`AudioOutput::configure`] call verifies the requested format
//! against what the driver was built with.

use embassy_stm32::peripherals::SAI1;
use embassy_stm32::sai::{
    Config as SaiConfig, DataSize, MasterClockDivider, Mode, Sai, StereoMono, TxRx,
};
use platform::audio::{AudioConfig, AudioOutput, ChannelLayout};

use crate::boot::{MCLK_FS_RATIO, SAI1_KERNEL_HZ};

/// SAI DMA ring buffer length in 16-bit words (two half-buffers).
pub const SAI_DMA_BUFFER_LEN: usize = 4096;

/// One half-buffer of silence: primes the transmitter on enable and flushes
/// the tail through the FIFO on disable.
static SILENCE: [u16; SAI_DMA_BUFFER_LEN / 2] = [0; SAI_DMA_BUFFER_LEN / 2];

/// Errors from the SAI output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioError {
    /// The requested format cannot be produced by this channel (wrong bit
    /// depth, or a sample rate the kernel clock cannot divide to).
    #[error("unsupported audio format")]
    Unsupported,
    /// `enable`/`write` was called before a successful `configure`.
    #[error("channel not configured")]
    NotConfigured,
    /// The SAI transfer failed (DMA overrun).
    #[error("sai write failed")]
    Write,
}

/// Map an [`AudioConfig`] onto the SAI driver configuration.
///
/// # Errors
///
/// [`AudioError::Unsupported`] when the bit depth is not 16 or the fixed
/// kernel clock cannot produce `256 × sample_rate` with an integer divider.
pub fn sai_config(config: &AudioConfig) -> Result<SaiConfig, AudioError> {
    config.validate().map_err(|_| AudioError::Unsupported)?;
    if config.bit_depth != 16 {
        return Err(AudioError::Unsupported);
    }

    let mclk_hz = config
        .sample_rate_hz
        .saturating_mul(MCLK_FS_RATIO);
    #[allow(clippy::arithmetic_side_effects)] // mclk_hz ≥ 256 × 8000 after validate()
    let divider = match (SAI1_KERNEL_HZ / mclk_hz, SAI1_KERNEL_HZ % mclk_hz) {
        (1, 0) => MasterClockDivider::Div1,
        (2, 0) => MasterClockDivider::Div2,
        (4, 0) => MasterClockDivider::Div4,
        (8, 0) => MasterClockDivider::Div8,
        _ => return Err(AudioError::Unsupported),
    };

    let mut sai = SaiConfig::default();
    sai.mode = Mode::Master;
    sai.tx_rx = TxRx::Transmitter;
    sai.data_size = DataSize::Data16;
    sai.stereo_mono = match config.layout {
        ChannelLayout::Mono => StereoMono::Mono,
        ChannelLayout::Stereo => StereoMono::Stereo,
    };
    sai.master_clock_divider = divider;
    // Remaining defaults give free-protocol I²S (Philips) framing.
    Ok(sai)
}

/// View signed samples as the unsigned words the SAI driver transfers.
fn sample_words(samples: &[i16]) -> &[u16] {
    // SAFETY: i16 and u16 have identical size and alignment and no invalid
    // bit patterns; the DAC interprets the wire bits as signed PCM either way.
    unsafe { core::slice::from_raw_parts(samples.as_ptr().cast::<u16>(), samples.len()) }
}

/// The SAI1 output channel.
///
/// Construction takes the already-built SAI driver together with the
/// [`AudioConfig`] it was built for; dropping the value releases the
/// peripheral (≙ channel destruction).
pub struct SaiAudioOut {
    sai: Sai<'static, SAI1, u16>,
    hw_config: AudioConfig,
    configured: bool,
    enabled: bool,
}

impl SaiAudioOut {
    /// Wrap a SAI driver built for `hw_config`.
    #[must_use]
    pub fn new(sai: Sai<'static, SAI1, u16>, hw_config: AudioConfig) -> Self {
        Self {
            sai,
            hw_config,
            configured: false,
            enabled: false,
        }
    }
}

impl AudioOutput for SaiAudioOut {
    type Error = AudioError;

    async fn configure(&mut self, config: &AudioConfig) -> Result<(), AudioError> {
        // The driver's format is fixed at construction; configure verifies
        // the request against it.
        if *config != self.hw_config {
            return Err(AudioError::Unsupported);
        }
        sai_config(config)?;
        self.configured = true;
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), AudioError> {
        if !self.configured {
            return Err(AudioError::NotConfigured);
        }
        if !self.enabled {
            // Priming write: starts the DMA stream with one half-buffer of
            // silence so the first payload chunk never underruns.
            self.sai
                .write(&SILENCE)
                .await
                .map_err(|_| AudioError::Write)?;
            self.enabled = true;
        }
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), AudioError> {
        if self.enabled {
            // Push one half-buffer of silence so the final payload samples
            // drain through the FIFO before the channel goes quiet.
            self.sai
                .write(&SILENCE)
                .await
                .map_err(|_| AudioError::Write)?;
            self.enabled = false;
        }
        Ok(())
    }

    async fn write(&mut self, samples: &[i16]) -> Result<usize, AudioError> {
        if !self.enabled {
            return Err(AudioError::NotConfigured);
        }
        self.sai
            .write(sample_words(samples))
            .await
            .map_err(|_| AudioError::Write)?;
        Ok(samples.len())
    }
}
