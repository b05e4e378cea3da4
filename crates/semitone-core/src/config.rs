//! Processor configuration.
//!
//! ## Range Limits
//!
//! - `sample_rate`: 1 - 384000 Hz
//! - `channels`: 1 - 16 (SoundTouch's channel ceiling)
//! - `pitch_semitones`: -24 to +24 (±2 octaves)
//! - `tempo` / `rate`: 0.25 - 4.0

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Convert a semitone offset to a frequency ratio: 2^(st/12)
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f64 {
    2.0_f64.powf(semitones as f64 / 12.0)
}

/// WSOLA tuning passed through to the processor.
///
/// Zero for `sequence_ms` or `seek_window_ms` lets the processor pick a
/// value from the current tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchSettings {
    /// Length of a single processing sequence in milliseconds (0 = automatic)
    pub sequence_ms: u32,
    /// Seek window for the best overlap position in milliseconds (0 = automatic)
    pub seek_window_ms: u32,
    /// Overlap length between sequences in milliseconds
    pub overlap_ms: u32,
    /// Anti-alias filter for the rate transposer
    pub anti_alias_filter: bool,
}

impl StretchSettings {
    /// Upper bound for any millisecond setting
    pub const MAX_MS: u32 = 1000;

    /// Shorter sequences, suited to speech
    pub fn speech() -> Self {
        Self {
            sequence_ms: 40,
            seek_window_ms: 15,
            overlap_ms: 8,
            anti_alias_filter: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.overlap_ms == 0 {
            return Err(Error::InvalidConfig("overlap_ms must be non-zero".into()));
        }
        for (name, value) in [
            ("sequence_ms", self.sequence_ms),
            ("seek_window_ms", self.seek_window_ms),
            ("overlap_ms", self.overlap_ms),
        ] {
            if value > Self::MAX_MS {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be at most {} ms, got {value}",
                    Self::MAX_MS
                )));
            }
        }
        Ok(())
    }
}

impl Default for StretchSettings {
    fn default() -> Self {
        Self {
            sequence_ms: 0,
            seek_window_ms: 0,
            overlap_ms: 8,
            anti_alias_filter: true,
        }
    }
}

/// Configuration for a single processing context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShifterConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: u32,

    /// Pitch shift in semitones (0.0 = unchanged)
    pub pitch_semitones: f32,

    /// Playback tempo without pitch change (1.0 = unchanged)
    pub tempo: f32,

    /// Playback rate, changing tempo and pitch together (1.0 = unchanged)
    pub rate: f32,

    /// Optional WSOLA tuning; `None` keeps the processor defaults
    pub settings: Option<StretchSettings>,
}

impl ShifterConfig {
    pub const MIN_SAMPLE_RATE: u32 = 1;
    pub const MAX_SAMPLE_RATE: u32 = 384_000;
    pub const MAX_CHANNELS: u32 = 16;
    /// Minimum pitch shift (-2 octaves)
    pub const MIN_PITCH_SEMITONES: f32 = -24.0;
    /// Maximum pitch shift (+2 octaves)
    pub const MAX_PITCH_SEMITONES: f32 = 24.0;
    pub const MIN_TEMPO: f32 = 0.25;
    pub const MAX_TEMPO: f32 = 4.0;

    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            channels,
            ..Self::default()
        }
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn channels(mut self, channels: u32) -> Self {
        self.channels = channels;
        self
    }

    /// Clamped to ±24 semitones. Non-finite values are kept and rejected by
    /// [`validate`](Self::validate).
    pub fn pitch_semitones(mut self, semitones: f32) -> Self {
        self.pitch_semitones = Self::clamp_pitch(semitones);
        self
    }

    pub fn tempo(mut self, tempo: f32) -> Self {
        self.tempo = Self::clamp_tempo(tempo);
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Self::clamp_tempo(rate);
        self
    }

    pub fn settings(mut self, settings: StretchSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Check every field against its range.
    pub fn validate(&self) -> Result<()> {
        validate_format(self.sample_rate as i64, self.channels as i64)?;
        if !self.pitch_semitones.is_finite() {
            return Err(Error::InvalidPitch(self.pitch_semitones));
        }
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(Error::InvalidTempo(self.tempo));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(Error::InvalidRate(self.rate));
        }
        if let Some(settings) = &self.settings {
            settings.validate()?;
        }
        Ok(())
    }

    /// Validate, then bring pitch/tempo/rate into their supported ranges.
    ///
    /// Deserialized configs and struct literals bypass the clamping setters;
    /// this is the form a processor is built from.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(Self {
            pitch_semitones: Self::clamp_pitch(self.pitch_semitones),
            tempo: Self::clamp_tempo(self.tempo),
            rate: Self::clamp_tempo(self.rate),
            ..self
        })
    }

    /// Frequency ratio for the configured pitch
    pub fn pitch_ratio(&self) -> f64 {
        semitones_to_ratio(self.pitch_semitones)
    }

    #[inline]
    pub fn clamp_pitch(semitones: f32) -> f32 {
        semitones.clamp(Self::MIN_PITCH_SEMITONES, Self::MAX_PITCH_SEMITONES)
    }

    #[inline]
    pub fn clamp_tempo(value: f32) -> f32 {
        value.clamp(Self::MIN_TEMPO, Self::MAX_TEMPO)
    }
}

impl Default for ShifterConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            pitch_semitones: 0.0,
            tempo: 1.0,
            rate: 1.0,
            settings: None,
        }
    }
}

/// Validate a raw sample rate / channel pair as received from a caller.
pub fn validate_format(sample_rate: i64, channels: i64) -> Result<(u32, u32)> {
    if sample_rate < ShifterConfig::MIN_SAMPLE_RATE as i64
        || sample_rate > ShifterConfig::MAX_SAMPLE_RATE as i64
    {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    if channels < 1 || channels > ShifterConfig::MAX_CHANNELS as i64 {
        return Err(Error::InvalidChannels(channels));
    }
    Ok((sample_rate as u32, channels as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_default() {
        let config = ShifterConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ShifterConfig::new(48000, 1)
            .pitch_semitones(-5.0)
            .tempo(1.25)
            .settings(StretchSettings::speech());

        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 1);
        assert_relative_eq!(config.pitch_semitones, -5.0);
        assert_relative_eq!(config.tempo, 1.25);
        assert_eq!(config.settings, Some(StretchSettings::speech()));
    }

    #[test]
    fn test_config_clamping() {
        let config = ShifterConfig::default()
            .pitch_semitones(48.0)
            .tempo(10.0)
            .rate(0.01);

        assert_relative_eq!(config.pitch_semitones, 24.0);
        assert_relative_eq!(config.tempo, 4.0);
        assert_relative_eq!(config.rate, 0.25);
    }

    #[test]
    fn test_validated_clamps_deserialized_ranges() {
        let config: ShifterConfig = serde_json::from_str(
            r#"{"pitch_semitones": 100.0, "tempo": 1e9, "rate": 1e-30}"#,
        )
        .unwrap();

        let config = config.validated().unwrap();
        assert_relative_eq!(config.pitch_semitones, 24.0);
        assert_relative_eq!(config.tempo, 4.0);
        assert_relative_eq!(config.rate, 0.25);
        assert_relative_eq!(config.pitch_ratio(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validated_rejects_non_positive_rate() {
        let config = ShifterConfig {
            rate: 0.0,
            ..ShifterConfig::default()
        };
        assert!(matches!(config.validated(), Err(Error::InvalidRate(_))));
    }

    #[test]
    fn test_validate_rejects_format() {
        assert_eq!(
            ShifterConfig::new(0, 2).validate(),
            Err(Error::InvalidSampleRate(0))
        );
        assert_eq!(
            ShifterConfig::new(44100, 0).validate(),
            Err(Error::InvalidChannels(0))
        );
        assert_eq!(
            ShifterConfig::new(44100, 17).validate(),
            Err(Error::InvalidChannels(17))
        );
        assert_eq!(validate_format(-1, 2), Err(Error::InvalidSampleRate(-1)));
        assert_eq!(validate_format(44100, 2), Ok((44100, 2)));
    }

    #[test]
    fn test_validate_rejects_non_finite_pitch() {
        let config = ShifterConfig::default().pitch_semitones(f32::NAN);
        assert!(matches!(config.validate(), Err(Error::InvalidPitch(_))));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let settings = StretchSettings {
            overlap_ms: 0,
            ..StretchSettings::default()
        };
        let config = ShifterConfig::default().settings(settings);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let settings = StretchSettings {
            sequence_ms: 5000,
            ..StretchSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pitch_ratio() {
        assert_relative_eq!(ShifterConfig::default().pitch_semitones(12.0).pitch_ratio(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(semitones_to_ratio(-12.0), 0.5, epsilon = 1e-9);
        assert_relative_eq!(semitones_to_ratio(0.0), 1.0);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = ShifterConfig::new(22050, 1)
            .pitch_semitones(2.0)
            .settings(StretchSettings::speech());
        let json = serde_json::to_string(&config).unwrap();
        let back: ShifterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_config_serde_partial_uses_defaults() {
        let config: ShifterConfig =
            serde_json::from_str(r#"{"sample_rate": 48000, "pitch_semitones": -3.0}"#).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_relative_eq!(config.tempo, 1.0);
        assert!(config.settings.is_none());
    }
}
