//! Sample format conversion at the boundary.
//!
//! The processor works on interleaved float32. Callers that hold PCM16 go
//! through these helpers on the way in and out:
//!
//! - PCM16 -> float32: divide by 32767
//! - float32 -> PCM16: multiply by 32767, clamp to the i16 range, truncate toward zero
//!
//! Out-of-range floats clamp instead of wrapping, and `NaN` becomes silence.

use serde::{Deserialize, Serialize};

/// Full-scale value used in both directions.
pub const PCM16_SCALE: f32 = 32767.0;

/// Sample representation crossing the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 32-bit float, nominal range -1.0..=1.0 (canonical)
    #[default]
    F32,
    /// 16-bit signed integer PCM
    Pcm16,
}

/// A sample type the processor can accept and produce.
///
/// The processor itself always runs on `f32`; other formats convert on
/// every transfer.
pub trait Sample: Copy + Default + Send + 'static {
    /// Format tag for this sample type
    const FORMAT: SampleFormat;

    fn to_f32(self) -> f32;

    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::Pcm16;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / PCM16_SCALE
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return 0;
        }
        (value * PCM16_SCALE).clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }
}

/// Convert PCM16 samples to float32.
pub fn pcm16_to_f32(input: &[i16]) -> Vec<f32> {
    input.iter().map(|&s| s.to_f32()).collect()
}

/// Convert float32 samples to PCM16, clamping out-of-range values.
pub fn f32_to_pcm16(input: &[f32]) -> Vec<i16> {
    input.iter().map(|&s| i16::from_f32(s)).collect()
}

/// Convert into a caller-provided buffer. Returns the number of samples written,
/// which is the shorter of the two lengths.
pub fn convert_into<A: Sample, B: Sample>(input: &[A], output: &mut [B]) -> usize {
    let count = input.len().min(output.len());
    for (dst, &src) in output[..count].iter_mut().zip(&input[..count]) {
        *dst = B::from_f32(src.to_f32());
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_pcm16_full_scale() {
        assert_relative_eq!(i16::MAX.to_f32(), 1.0);
        assert_relative_eq!((-32767i16).to_f32(), -1.0);
        assert!(i16::MIN.to_f32() < -1.0);
        assert_eq!(0i16.to_f32(), 0.0);
    }

    #[test]
    fn test_f32_to_pcm16_truncates() {
        // 0.5 * 32767 = 16383.5 -> 16383
        assert_eq!(i16::from_f32(0.5), 16383);
        assert_eq!(i16::from_f32(-0.5), -16383);
    }

    #[test]
    fn test_f32_to_pcm16_clamps() {
        assert_eq!(i16::from_f32(1.5), i16::MAX);
        assert_eq!(i16::from_f32(-2.0), i16::MIN);
        assert_eq!(i16::from_f32(f32::INFINITY), i16::MAX);
        assert_eq!(i16::from_f32(f32::NEG_INFINITY), i16::MIN);
    }

    #[test]
    fn test_nan_is_silence() {
        assert_eq!(i16::from_f32(f32::NAN), 0);
    }

    #[test]
    fn test_convert_into_shorter_output() {
        let input = [0.25f32, -0.25, 1.0, -1.0];
        let mut output = [0i16; 2];
        assert_eq!(convert_into(&input, &mut output), 2);
        assert_eq!(output, [8191, -8191]);
    }

    #[test]
    fn test_sample_format_tags() {
        assert_eq!(<f32 as Sample>::FORMAT, SampleFormat::F32);
        assert_eq!(<i16 as Sample>::FORMAT, SampleFormat::Pcm16);
    }

    proptest! {
        #[test]
        fn pcm16_round_trip_within_one_step(s in any::<i16>()) {
            let back = i16::from_f32(s.to_f32());
            prop_assert!((back as i32 - s as i32).abs() <= 1);
        }

        #[test]
        fn f32_to_pcm16_never_panics(x in any::<f32>()) {
            let _ = i16::from_f32(x);
        }

        #[test]
        fn slice_helpers_preserve_length(v in proptest::collection::vec(any::<i16>(), 0..256)) {
            let floats = pcm16_to_f32(&v);
            prop_assert_eq!(floats.len(), v.len());
            prop_assert_eq!(f32_to_pcm16(&floats).len(), v.len());
        }
    }
}
