//! Audio output abstraction.

/// Audio output channel trait.
///
/// One implementation drives one playback direction of a hardware audio
/// interface. The channel must be [`configure`]d before it is enabled and
/// written to; creation and destruction of the underlying hardware channel
/// map to construction and drop of the implementing type.
///
/// [`configure`]: AudioOutput::configure
pub trait AudioOutput {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Apply clock rate and sample format. Fails if the hardware cannot
    /// satisfy `config`.
    fn configure(
        &mut self,
        config: &AudioConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Start the channel. Idempotent.
    fn enable(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop the channel. Idempotent.
    fn disable(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Write interleaved samples, blocking without timeout until the hardware
    /// has accepted them. Returns the number of samples transferred.
    fn write(
        &mut self,
        samples: &[i16],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;
}

/// Interleaved channel layout of a sample frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelLayout {
    /// One channel per frame.
    Mono,
    /// Two interleaved channels per frame.
    Stereo,
}

impl ChannelLayout {
    /// Number of interleaved channels.
    #[must_use]
    pub fn channels(self) -> u8 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Reason an [`AudioConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sample rate outside the supported 8 kHz – 192 kHz range.
    #[error("sample rate out of range")]
    SampleRate,
    /// Bit depth other than 16, 24 or 32.
    #[error("unsupported bit depth")]
    BitDepth,
}

/// Audio output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bit_depth: u8,
    /// Channel layout.
    pub layout: ChannelLayout,
}

impl AudioConfig {
    /// Check rate and bit depth against the supported envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for out-of-range sample rates or unsupported
    /// bit depths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8_000..=192_000).contains(&self.sample_rate_hz) {
            return Err(ConfigError::SampleRate);
        }
        if !matches!(self.bit_depth, 16 | 24 | 32) {
            return Err(ConfigError::BitDepth);
        }
        Ok(())
    }

    /// Bit clock frequency: `bit_depth × channels × sample_rate`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // bounded by validate(): ≤ 32 × 2 × 192_000
    pub fn bclk_hz(&self) -> u32 {
        u32::from(self.bit_depth) * u32::from(self.layout.channels()) * self.sample_rate_hz
    }
}

impl Default for AudioConfig {
    /// The fixed format of the shipped audio payload: 48 kHz, 16-bit, mono.
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000,
            bit_depth: 16,
            layout: ChannelLayout::Mono,
        }
    }
}
