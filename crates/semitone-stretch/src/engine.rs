//! Thin owner of the wrapped SoundTouch processor.

use semitone_core::config::semitones_to_ratio;
use semitone_core::{ShifterConfig, StretchSettings};
use soundtouch::{Setting, SoundTouch};

/// Owned SoundTouch instance, configured from a [`ShifterConfig`].
pub(crate) struct Engine(SoundTouch);

impl Engine {
    pub(crate) fn new(config: &ShifterConfig) -> Self {
        let mut st = SoundTouch::new();
        st.set_sample_rate(config.sample_rate);
        st.set_channels(config.channels);
        st.set_tempo(config.tempo as f64);
        st.set_rate(config.rate as f64);
        st.set_pitch(config.pitch_ratio());

        let mut engine = Self(st);
        if let Some(settings) = &config.settings {
            engine.apply_settings(settings);
        }
        engine
    }

    pub(crate) fn apply_settings(&mut self, settings: &StretchSettings) {
        self.0
            .set_setting(Setting::SequenceMs, settings.sequence_ms as _);
        self.0
            .set_setting(Setting::SeekwindowMs, settings.seek_window_ms as _);
        self.0
            .set_setting(Setting::OverlapMs, settings.overlap_ms as _);
        self.0
            .set_setting(Setting::UseAaFilter, settings.anti_alias_filter as _);
    }

    pub(crate) fn set_pitch_semitones(&mut self, semitones: f32) {
        self.0.set_pitch(semitones_to_ratio(semitones));
    }

    pub(crate) fn set_tempo(&mut self, tempo: f32) {
        self.0.set_tempo(tempo as f64);
    }

    pub(crate) fn set_rate(&mut self, rate: f32) {
        self.0.set_rate(rate as f64);
    }

    /// `samples` holds exactly `frames * channels` interleaved values.
    pub(crate) fn put(&mut self, samples: &[f32], frames: usize) {
        self.0.put_samples(samples, frames);
    }

    /// `output` holds at least `max_frames * channels` values.
    pub(crate) fn receive(&mut self, output: &mut [f32], max_frames: usize) -> usize {
        self.0.receive_samples(output, max_frames)
    }

    pub(crate) fn flush(&mut self) {
        self.0.flush();
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn unprocessed_frames(&self) -> usize {
        self.0.num_unprocessed_samples() as usize
    }
}
