//! WAV container header handling.
//!
//! The player consumes files with the canonical minimal layout: a 44-byte
//! RIFF/WAVE/`fmt ` header followed directly by a `data` chunk of raw
//! interleaved little-endian PCM samples. Only the container markers are
//! enforced; the declared format fields are parsed and surfaced so the caller
//! can compare them against the configured output, but a mismatch does not
//! stop playback.

use platform::audio::AudioConfig;

/// Length of the canonical minimal WAV header, in bytes.
pub const HEADER_LEN: usize = 44;

/// Why a header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WavError {
    /// The file ended before the 44-byte header was complete.
    #[error("file shorter than the 44-byte header")]
    Truncated,
    /// One of the RIFF / WAVE / `fmt ` markers is missing.
    #[error("missing RIFF/WAVE/fmt marker")]
    BadMagic,
}

/// Format fields declared by a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavInfo {
    /// Declared sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Declared channel count (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Declared bits per sample.
    pub bits_per_sample: u16,
    /// Declared payload size in bytes (`data` chunk length).
    pub data_bytes: u32,
}

impl WavInfo {
    /// Parse the fixed 44-byte header.
    ///
    /// Checks the RIFF / WAVE / `fmt ` markers and extracts the declared
    /// format fields. The fields are *not* validated against anything — they
    /// describe what the file claims to contain.
    ///
    /// # Errors
    ///
    /// Returns [`WavError::BadMagic`] when a container marker is missing.
    #[allow(clippy::indexing_slicing)] // fixed 44-byte array; every range is in bounds
    pub fn parse(header: &[u8; HEADER_LEN]) -> Result<Self, WavError> {
        if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" || &header[12..16] != b"fmt " {
            return Err(WavError::BadMagic);
        }
        Ok(Self {
            channels: u16::from_le_bytes([header[22], header[23]]),
            sample_rate_hz: u32::from_le_bytes([header[24], header[25], header[26], header[27]]),
            bits_per_sample: u16::from_le_bytes([header[34], header[35]]),
            data_bytes: u32::from_le_bytes([header[40], header[41], header[42], header[43]]),
        })
    }

    /// `true` when the declared format matches the configured output.
    #[must_use]
    pub fn matches(&self, config: &AudioConfig) -> bool {
        self.sample_rate_hz == config.sample_rate_hz
            && self.channels == u16::from(config.layout.channels())
            && self.bits_per_sample == u16::from(config.bit_depth)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use platform::audio::ChannelLayout;

    /// Build a canonical 44-byte header for the given format.
    fn header(rate: u32, channels: u16, bits: u16, data_bytes: u32) -> [u8; HEADER_LEN] {
        let mut h = [0u8; HEADER_LEN];
        h[0..4].copy_from_slice(b"RIFF");
        h[4..8].copy_from_slice(&(36 + data_bytes).to_le_bytes());
        h[8..12].copy_from_slice(b"WAVE");
        h[12..16].copy_from_slice(b"fmt ");
        h[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
        h[22..24].copy_from_slice(&channels.to_le_bytes());
        h[24..28].copy_from_slice(&rate.to_le_bytes());
        let byte_rate = rate * u32::from(channels) * u32::from(bits) / 8;
        h[28..32].copy_from_slice(&byte_rate.to_le_bytes());
        h[32..34].copy_from_slice(&(channels * bits / 8).to_le_bytes());
        h[34..36].copy_from_slice(&bits.to_le_bytes());
        h[36..40].copy_from_slice(b"data");
        h[40..44].copy_from_slice(&data_bytes.to_le_bytes());
        h
    }

    #[test]
    fn parse_extracts_declared_fields() {
        let info = WavInfo::parse(&header(48_000, 1, 16, 2048)).unwrap();
        assert_eq!(info.sample_rate_hz, 48_000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.data_bytes, 2048);
    }

    #[test]
    fn parse_rejects_missing_riff() {
        let mut h = header(48_000, 1, 16, 0);
        h[0] = b'X';
        assert_eq!(WavInfo::parse(&h).unwrap_err(), WavError::BadMagic);
    }

    #[test]
    fn parse_rejects_missing_wave() {
        let mut h = header(48_000, 1, 16, 0);
        h[8..12].copy_from_slice(b"AIFF");
        assert_eq!(WavInfo::parse(&h).unwrap_err(), WavError::BadMagic);
    }

    #[test]
    fn parse_rejects_missing_fmt() {
        let mut h = header(48_000, 1, 16, 0);
        h[12] = b'F';
        assert_eq!(WavInfo::parse(&h).unwrap_err(), WavError::BadMagic);
    }

    #[test]
    fn matches_compares_all_three_fields() {
        let config = AudioConfig {
            sample_rate_hz: 48_000,
            bit_depth: 16,
            layout: ChannelLayout::Mono,
        };
        assert!(WavInfo::parse(&header(48_000, 1, 16, 0)).unwrap().matches(&config));
        assert!(!WavInfo::parse(&header(44_100, 1, 16, 0)).unwrap().matches(&config));
        assert!(!WavInfo::parse(&header(48_000, 2, 16, 0)).unwrap().matches(&config));
        assert!(!WavInfo::parse(&header(48_000, 1, 8, 0)).unwrap().matches(&config));
    }
}
