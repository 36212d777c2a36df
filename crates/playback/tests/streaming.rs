//! Streaming-loop integration tests — the transfer loop's observable contract
//! against the platform mocks.
//!
//! Run with: cargo test -p playback --test streaming
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects
)]

use platform::mocks::{MockAudioOutput, MockStorage};
use platform::AudioConfig;
use platform::AudioOutput;
use playback::{play, PlayError};

/// Minimal canonical WAV: 44-byte header + little-endian payload.
fn wav_bytes(payload: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let data_len = (payload.len() * 2) as u32;
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&48_000u32.to_le_bytes());
    bytes.extend_from_slice(&96_000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in payload {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

async fn ready_audio() -> MockAudioOutput {
    let mut audio = MockAudioOutput::new();
    audio
        .configure(&AudioConfig::default())
        .await
        .expect("default config is valid");
    audio
}

/// Payload an exact multiple of the buffer capacity: payload/C full writes.
#[tokio::test]
async fn exact_multiple_payload_gives_full_writes() {
    const C: usize = 8;
    let payload: Vec<i16> = (0..32).map(|i| i as i16).collect();
    let mut storage = MockStorage::new();
    storage.add_file("TONE.WAV", &wav_bytes(&payload));
    let mut audio = ready_audio().await;
    let mut buf = [0i16; C];

    let report = play(&mut storage, &mut audio, "TONE.WAV", &mut buf)
        .await
        .unwrap();

    assert_eq!(report.writes, 4);
    assert_eq!(report.samples, 32);
    assert_eq!(audio.write_lens(), &[C, C, C, C]);
}

/// Payload not a multiple of C: the final write carries the remainder and
/// nothing follows it.
#[tokio::test]
async fn short_final_chunk_is_written_at_actual_length() {
    const C: usize = 8;
    let payload = [42i16; 21]; // 2 full chunks + 5
    let mut storage = MockStorage::new();
    storage.add_file("TONE.WAV", &wav_bytes(&payload));
    let mut audio = ready_audio().await;
    let mut buf = [0i16; C];

    let report = play(&mut storage, &mut audio, "TONE.WAV", &mut buf)
        .await
        .unwrap();

    assert_eq!(report.samples, 21);
    assert_eq!(audio.write_lens(), &[8, 8, 5]);
}

/// Header-only file: zero writes, but the enable/disable bracket still runs.
#[tokio::test]
async fn zero_length_payload_still_brackets_the_channel() {
    let mut storage = MockStorage::new();
    storage.add_file("EMPTY.WAV", &wav_bytes(&[]));
    let mut audio = ready_audio().await;
    let mut buf = [0i16; 8];

    let report = play(&mut storage, &mut audio, "EMPTY.WAV", &mut buf)
        .await
        .unwrap();

    assert_eq!(report.writes, 0);
    assert_eq!(report.samples, 0);
    assert_eq!(audio.enable_count(), 1);
    assert_eq!(audio.disable_count(), 1);
    assert!(!audio.is_enabled());
}

/// A missing file is a reported failure with zero channel activity.
#[tokio::test]
async fn missing_file_reports_open_error_without_channel_activity() {
    let mut storage = MockStorage::new();
    let mut audio = ready_audio().await;
    let mut buf = [0i16; 8];

    let err = play(&mut storage, &mut audio, "MISSING.WAV", &mut buf)
        .await
        .unwrap_err();

    assert_eq!(err, PlayError::Open);
    assert_eq!(audio.enable_count(), 0);
    assert_eq!(audio.disable_count(), 0);
    assert!(audio.write_lens().is_empty());
}

/// The channel is disabled exactly once per successful session, whatever the
/// payload length.
#[tokio::test]
async fn channel_disabled_exactly_once_per_session() {
    for len in [0usize, 1, 7, 8, 9, 64] {
        let payload = vec![1i16; len];
        let mut storage = MockStorage::new();
        storage.add_file("TONE.WAV", &wav_bytes(&payload));
        let mut audio = ready_audio().await;
        let mut buf = [0i16; 8];

        play(&mut storage, &mut audio, "TONE.WAV", &mut buf)
            .await
            .unwrap();

        assert_eq!(audio.disable_count(), 1, "payload len {len}");
        assert!(!audio.is_enabled(), "payload len {len}");
    }
}

/// Streaming reproduces the payload exactly, in order, split at the C-sample
/// boundary.
#[tokio::test]
async fn round_trip_preserves_sample_values_and_order() {
    const C: usize = 16;
    let payload: Vec<i16> = (0..100).map(|i| (i * 331 - 12_345) as i16).collect();
    let mut storage = MockStorage::new();
    storage.add_file("TONE.WAV", &wav_bytes(&payload));
    let mut audio = ready_audio().await;
    let mut buf = [0i16; C];

    let report = play(&mut storage, &mut audio, "TONE.WAV", &mut buf)
        .await
        .unwrap();

    assert_eq!(audio.written(), payload.as_slice());
    assert_eq!(report.samples, 100);
    // 100 samples in 16-sample chunks: 6 full + one 4-sample tail.
    assert_eq!(audio.write_lens(), &[16, 16, 16, 16, 16, 16, 4]);
}
