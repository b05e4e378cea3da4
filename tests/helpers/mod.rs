//! Test helpers and fixtures for semitone integration tests.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (passthrough, conversion)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)
//! - `INT16_EPSILON`: One PCM16 quantization step

#![allow(dead_code)]

pub mod tolerances;

use semitone::prelude::*;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Read block size used by the pipeline helpers
pub const TEST_BLOCK_FRAMES: usize = 512;

/// Route library logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
}

/// Create a mono shifter with the given pitch.
pub fn test_shifter(semitones: f32) -> PitchShifter {
    PitchShifter::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .channels(1)
        .pitch_semitones(semitones)
        .build()
        .expect("Failed to create test shifter")
}

/// Generate a test signal: sine wave at given frequency for specified frames.
pub fn generate_sine(frequency: f64, sample_rate: u32, num_frames: usize) -> Vec<f32> {
    (0..num_frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (2.0 * std::f64::consts::PI * frequency * t).sin()) as f32
        })
        .collect()
}

/// Interleave a mono signal into `channels` identical channels.
pub fn interleave(mono: &[f32], channels: usize) -> Vec<f32> {
    mono.iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels))
        .collect()
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Estimate the dominant frequency by counting positive-going zero crossings.
pub fn zero_crossing_frequency(samples: &[f32], sample_rate: u32) -> f64 {
    let crossings = samples
        .windows(2)
        .filter(|w| w[0] <= 0.0 && w[1] > 0.0)
        .count();
    crossings as f64 * sample_rate as f64 / samples.len().max(1) as f64
}

/// Put `input`, read `block`-frame chunks until dry, then flush-and-read until
/// dry. Returns all interleaved output.
pub fn run_to_completion(shifter: &mut PitchShifter, input: &[f32], block: usize) -> Vec<f32> {
    let channels = shifter.channels() as usize;
    let mut buf = vec![0.0f32; block * channels];
    let mut output = Vec::new();

    shifter.put_samples(input).expect("put_samples failed");
    loop {
        let frames = shifter.receive_samples(&mut buf);
        assert!(frames <= block, "received {} > {} frames", frames, block);
        if frames == 0 {
            break;
        }
        output.extend_from_slice(&buf[..frames * channels]);
    }
    loop {
        let frames = shifter.flush_and_receive_samples(&mut buf);
        assert!(frames <= block, "received {} > {} frames", frames, block);
        if frames == 0 {
            break;
        }
        output.extend_from_slice(&buf[..frames * channels]);
    }
    output
}
