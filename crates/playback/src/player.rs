//! The fixed-chunk transfer loop.
//!
//! [`open_stream`] opens a file and consumes its 44-byte header; [`stream`]
//! then moves the payload to the output channel in chunks of at most the
//! transfer buffer's capacity. The split gives the caller a point between
//! header parse and the first sample write to inspect the declared format
//! (e.g. to log a mismatch with the configured output).

use platform::audio::AudioOutput;
use platform::storage::Storage;

use crate::wav::{WavError, WavInfo, HEADER_LEN};

/// Errors returned by the playback pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    /// The file could not be opened, or failed while reading the header.
    /// Recoverable at the caller; no channel state was touched.
    #[error("failed to open audio stream")]
    Open,
    /// The file is not a WAV container.
    #[error("not a wav file: {0}")]
    NotWav(WavError),
    /// A payload read failed mid-stream.
    #[error("read failed mid-stream")]
    Read,
    /// The output channel rejected a sample write.
    #[error("output channel write failed")]
    Write,
    /// Enabling or disabling the output channel failed.
    #[error("output channel enable/disable failed")]
    Channel,
}

/// An open audio stream, positioned at the start of the sample payload.
///
/// Produced by [`open_stream`]; consumed by [`stream`].
#[derive(Debug)]
pub struct AudioStream<H> {
    file: H,
    info: WavInfo,
}

impl<H> AudioStream<H> {
    /// Format fields declared by the file's header.
    #[must_use]
    pub fn info(&self) -> WavInfo {
        self.info
    }
}

/// Observable outcome of a completed playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackReport {
    /// Total samples transferred to the output.
    pub samples: u64,
    /// Number of write calls issued.
    pub writes: u32,
    /// The header the stream carried.
    pub wav: WavInfo,
}

/// View a sample buffer as raw bytes for reading from storage.
///
/// On-disk samples are little-endian; [`stream`] normalises each chunk with
/// `i16::from_le` after the read, so the view is byte-order correct on any
/// target.
fn sample_bytes_mut(samples: &mut [i16]) -> &mut [u8] {
    let len = samples.len().saturating_mul(2);
    // SAFETY: `u8` has alignment 1 and no invalid bit patterns; the view spans
    // exactly the allocation of `samples`, and the mutable borrow of `samples`
    // is held for the lifetime of the returned slice.
    unsafe { core::slice::from_raw_parts_mut(samples.as_mut_ptr().cast::<u8>(), len) }
}

/// Open `path` and consume its 44-byte header.
///
/// On success the returned stream is positioned at the first payload byte.
/// On any failure the file is closed again; the output channel is never
/// touched by this function.
///
/// # Errors
///
/// [`PlayError::Open`] when the file cannot be opened or read;
/// [`PlayError::NotWav`] when the first 44 bytes are missing or are not a
/// RIFF/WAVE header.
#[allow(clippy::arithmetic_side_effects)] // filled += n ≤ HEADER_LEN per loop guard
#[allow(clippy::indexing_slicing)] // filled < HEADER_LEN inside the loop
pub async fn open_stream<S: Storage>(
    storage: &mut S,
    path: &str,
) -> Result<AudioStream<S::FileHandle>, PlayError> {
    let mut file = storage.open(path).await.map_err(|_| PlayError::Open)?;

    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0usize;
    while filled < HEADER_LEN {
        let n = match storage.read(&mut file, &mut header[filled..]).await {
            Ok(n) => n,
            Err(_) => {
                let _ = storage.close(file).await;
                return Err(PlayError::Open);
            }
        };
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled < HEADER_LEN {
        let _ = storage.close(file).await;
        return Err(PlayError::NotWav(WavError::Truncated));
    }

    match WavInfo::parse(&header) {
        Ok(info) => Ok(AudioStream { file, info }),
        Err(e) => {
            let _ = storage.close(file).await;
            Err(PlayError::NotWav(e))
        }
    }
}

/// Transfer the stream's payload to the output channel.
///
/// The channel is enabled once before the first read and disabled exactly
/// once when the stream is exhausted. Each iteration reads up to
/// `buf.len()` samples and writes exactly the number read — a short final
/// chunk is written at its actual length, never padded with stale buffer
/// content. The write blocks without timeout until the hardware accepts the
/// samples. A dangling final byte (odd payload length) cannot form a sample
/// and is dropped.
///
/// On a read or write failure the channel is disabled best-effort and the
/// file closed before the error is returned.
///
/// # Errors
///
/// [`PlayError::Read`], [`PlayError::Write`] or [`PlayError::Channel`].
#[allow(clippy::arithmetic_side_effects)] // n_bytes/2 ≤ buf.len(); counters bounded by payload size
#[allow(clippy::indexing_slicing)] // n_samples = n_bytes/2 ≤ buf.len() since the read fills at most 2×buf.len() bytes
pub async fn stream<S, A>(
    stream: AudioStream<S::FileHandle>,
    storage: &mut S,
    audio: &mut A,
    buf: &mut [i16],
) -> Result<PlaybackReport, PlayError>
where
    S: Storage,
    A: AudioOutput,
{
    let AudioStream { mut file, info } = stream;

    if audio.enable().await.is_err() {
        let _ = storage.close(file).await;
        return Err(PlayError::Channel);
    }

    let mut samples: u64 = 0;
    let mut writes: u32 = 0;
    loop {
        let n_bytes = match storage.read(&mut file, sample_bytes_mut(buf)).await {
            Ok(n) => n,
            Err(_) => {
                let _ = audio.disable().await;
                let _ = storage.close(file).await;
                return Err(PlayError::Read);
            }
        };
        let n_samples = n_bytes / 2;
        if n_samples == 0 {
            break;
        }
        for s in &mut buf[..n_samples] {
            *s = i16::from_le(*s);
        }
        if audio.write(&buf[..n_samples]).await.is_err() {
            let _ = audio.disable().await;
            let _ = storage.close(file).await;
            return Err(PlayError::Write);
        }
        samples += n_samples as u64;
        writes += 1;
    }

    if audio.disable().await.is_err() {
        let _ = storage.close(file).await;
        return Err(PlayError::Channel);
    }
    let _ = storage.close(file).await;

    Ok(PlaybackReport {
        samples,
        writes,
        wav: info,
    })
}

/// Open `path` and play it to completion: [`open_stream`] + [`stream`].
///
/// # Errors
///
/// Any [`PlayError`] from the two stages.
pub async fn play<S, A>(
    storage: &mut S,
    audio: &mut A,
    path: &str,
    buf: &mut [i16],
) -> Result<PlaybackReport, PlayError>
where
    S: Storage,
    A: AudioOutput,
{
    let session = open_stream(storage, path).await?;
    stream(session, storage, audio, buf).await
}
