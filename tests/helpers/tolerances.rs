//! Tolerance constants for audio testing.

/// Floating point rounding errors (passthrough, exact conversion).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// 16-bit quantization step size as seen from the float side.
pub const INT16_EPSILON: f32 = 1.0 / 32767.0;

/// Frames of slack allowed around an expected output length, covering the
/// processor's sequence/overlap granularity at 44.1-48 kHz.
pub const LENGTH_SLACK_FRAMES: usize = 512;
