//! Property-based tests for the transfer loop.
//! Verifies the chunking invariants hold for ALL payload lengths and buffer
//! capacities, not just fixed examples.
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
use playback::play;

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

/// Run one playback session and return (write lengths, captured samples).
fn run_session(payload: &[i16], cap: usize) -> (Vec<usize>, Vec<i16>) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("build test runtime");
    rt.block_on(async {
        let mut storage = MockStorage::new();
        storage.add_file("TONE.WAV", &wav_bytes(payload));
        let mut audio = MockAudioOutput::new();
        audio.configure(&AudioConfig::default()).await.unwrap();
        let mut buf = vec![0i16; cap];
        play(&mut storage, &mut audio, "TONE.WAV", &mut buf)
            .await
            .unwrap();
        assert_eq!(audio.disable_count(), 1);
        (audio.write_lens().to_vec(), audio.written().to_vec())
    })
}

proptest::proptest! {
    /// Every write except the last is exactly the buffer capacity, and the
    /// write count is ceil(payload / capacity).
    #[test]
    fn chunking_is_exact(len in 0usize..=300, cap in 1usize..=32) {
        let payload: Vec<i16> = (0..len).map(|i| i as i16).collect();
        let (lens, _) = run_session(&payload, cap);

        let expected_writes = len.div_ceil(cap);
        assert_eq!(lens.len(), expected_writes);
        for (i, &n) in lens.iter().enumerate() {
            if i + 1 < lens.len() {
                assert_eq!(n, cap, "non-final write must be full");
            } else {
                let tail = if len % cap == 0 { cap } else { len % cap };
                assert_eq!(n, tail, "final write must carry the remainder");
            }
        }
    }

    /// The output sees exactly the payload: same values, same order, no
    /// duplication or reordering.
    #[test]
    fn round_trip_is_lossless(len in 0usize..=300, cap in 1usize..=32, seed in 0i16..=i16::MAX) {
        let payload: Vec<i16> = (0..len)
            .map(|i| seed.wrapping_mul(i as i16).wrapping_add(i as i16))
            .collect();
        let (_, written) = run_session(&payload, cap);
        assert_eq!(written, payload);
    }
}
