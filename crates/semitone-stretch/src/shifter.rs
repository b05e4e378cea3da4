//! Owned pitch-shifting processing context.

use semitone_core::format::{self, Sample};
use semitone_core::{Error, Result, ShifterConfig, StretchSettings};

use crate::engine::Engine;

/// Frames drained per internal receive call in [`PitchShifter::process`]
const DRAIN_CHUNK_FRAMES: usize = 2048;

/// A pitch-shifting processing context.
///
/// Construction allocates the wrapped processor and dropping the value releases
/// it. [`destroy`](Self::destroy) consumes the context, so a released context
/// can never be used or released again.
///
/// All counts are frames (one sample per channel); buffers are interleaved.
///
/// # Example
///
/// ```ignore
/// use semitone_stretch::PitchShifter;
///
/// let mut shifter = PitchShifter::new(44100, 1)?;
/// shifter.set_pitch_semitones(2.0)?;
///
/// shifter.put_samples(&input)?;
/// let mut out = vec![0.0; 512];
/// let frames = shifter.receive_samples(&mut out);
///
/// shifter.destroy();
/// ```
pub struct PitchShifter {
    engine: Engine,
    sample_rate: u32,
    channels: u32,
    pitch_semitones: f32,
    tempo: f32,
    rate: f32,
    settings: Option<StretchSettings>,
    /// Input arrived since the last flush
    pending_input: bool,
    /// Conversion buffer for non-f32 transfers
    scratch: Vec<f32>,
}

impl PitchShifter {
    /// Create a context with no pitch change.
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        Self::with_config(ShifterConfig::new(sample_rate, channels))
    }

    pub fn builder() -> PitchShifterBuilder {
        PitchShifterBuilder::default()
    }

    /// Create a context from a full configuration.
    ///
    /// Pitch, tempo and rate outside their ranges are clamped, as the setters do.
    pub fn with_config(config: ShifterConfig) -> Result<Self> {
        let config = config.validated()?;

        let engine = Engine::new(&config);
        tracing::debug!(
            "Created pitch shifter: {} Hz, {} channel(s), {:+.2} st",
            config.sample_rate,
            config.channels,
            config.pitch_semitones
        );

        Ok(Self {
            engine,
            sample_rate: config.sample_rate,
            channels: config.channels,
            pitch_semitones: config.pitch_semitones,
            tempo: config.tempo,
            rate: config.rate,
            settings: config.settings,
            pending_input: false,
            scratch: Vec::new(),
        })
    }

    /// Release the context. Equivalent to dropping it.
    pub fn destroy(self) {}

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn pitch_semitones(&self) -> f32 {
        self.pitch_semitones
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current configuration, reflecting every applied setter
    pub fn config(&self) -> ShifterConfig {
        ShifterConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            pitch_semitones: self.pitch_semitones,
            tempo: self.tempo,
            rate: self.rate,
            settings: self.settings,
        }
    }

    /// Set the pitch shift for subsequently processed samples.
    ///
    /// Clamped to ±24 semitones; returns the applied value.
    pub fn set_pitch_semitones(&mut self, semitones: f32) -> Result<f32> {
        if !semitones.is_finite() {
            return Err(Error::InvalidPitch(semitones));
        }
        let applied = ShifterConfig::clamp_pitch(semitones);
        self.engine.set_pitch_semitones(applied);
        self.pitch_semitones = applied;
        Ok(applied)
    }

    /// Set the pitch shift in octaves. Returns the applied value in semitones.
    pub fn set_pitch_octaves(&mut self, octaves: f32) -> Result<f32> {
        self.set_pitch_semitones(octaves * 12.0)
    }

    /// Change tempo without changing pitch (1.0 = unchanged, clamped to 0.25 - 4.0).
    pub fn set_tempo(&mut self, tempo: f32) -> Result<f32> {
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(Error::InvalidTempo(tempo));
        }
        let applied = ShifterConfig::clamp_tempo(tempo);
        self.engine.set_tempo(applied);
        self.tempo = applied;
        Ok(applied)
    }

    /// Change tempo and pitch together (1.0 = unchanged, clamped to 0.25 - 4.0).
    pub fn set_rate(&mut self, rate: f32) -> Result<f32> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::InvalidRate(rate));
        }
        let applied = ShifterConfig::clamp_tempo(rate);
        self.engine.set_rate(applied);
        self.rate = applied;
        Ok(applied)
    }

    pub fn set_settings(&mut self, settings: StretchSettings) -> Result<()> {
        settings.validate()?;
        self.engine.apply_settings(&settings);
        self.settings = Some(settings);
        Ok(())
    }

    /// Submit interleaved float samples. The length must be a whole number of frames.
    pub fn put_samples(&mut self, samples: &[f32]) -> Result<()> {
        let frames = self.frames_in(samples.len())?;
        if frames == 0 {
            return Ok(());
        }
        self.engine.put(samples, frames);
        self.pending_input = true;
        tracing::trace!("put {} frames", frames);
        Ok(())
    }

    /// Submit interleaved PCM16 samples, converted to float on the way in.
    pub fn put_samples_i16(&mut self, samples: &[i16]) -> Result<()> {
        self.put_converted(samples)
    }

    /// Drain up to `output.len() / channels` processed frames.
    ///
    /// Returns the number of frames written. Zero is normal while the
    /// processor is still filling its pipeline.
    pub fn receive_samples(&mut self, output: &mut [f32]) -> usize {
        let max_frames = output.len() / self.channels as usize;
        if max_frames == 0 {
            return 0;
        }
        let frames = self.engine.receive(output, max_frames);
        tracing::trace!("received {} of {} frames", frames, max_frames);
        frames
    }

    /// Drain processed frames as PCM16, clamping out-of-range values.
    pub fn receive_samples_i16(&mut self, output: &mut [i16]) -> usize {
        self.receive_converted(output)
    }

    /// Signal end-of-stream so the retained tail becomes receivable.
    ///
    /// A flush with no input since the previous flush is a no-op.
    pub fn flush(&mut self) {
        if !self.pending_input {
            return;
        }
        self.engine.flush();
        self.pending_input = false;
        tracing::debug!(
            "Flushed pitch shifter, {} frames unprocessed",
            self.engine.unprocessed_frames()
        );
    }

    pub fn flush_and_receive_samples(&mut self, output: &mut [f32]) -> usize {
        self.flush();
        self.receive_samples(output)
    }

    pub fn flush_and_receive_samples_i16(&mut self, output: &mut [i16]) -> usize {
        self.flush();
        self.receive_samples_i16(output)
    }

    /// Put `input` and return everything the processor has ready afterwards.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.put_samples(input)?;
        Ok(self.drain())
    }

    /// Flush and return the remaining tail.
    pub fn finish(&mut self) -> Vec<f32> {
        self.flush();
        self.drain()
    }

    /// Discard all buffered input and output.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.pending_input = false;
    }

    /// Input frames still waiting inside the processing pipeline
    pub fn unprocessed_frames(&self) -> usize {
        self.engine.unprocessed_frames()
    }

    fn drain(&mut self) -> Vec<f32> {
        let channels = self.channels as usize;
        let mut output = Vec::new();
        let mut chunk = vec![0.0f32; DRAIN_CHUNK_FRAMES * channels];
        loop {
            let frames = self.receive_samples(&mut chunk);
            if frames == 0 {
                break;
            }
            output.extend_from_slice(&chunk[..frames * channels]);
        }
        output
    }

    fn put_converted<S: Sample>(&mut self, samples: &[S]) -> Result<()> {
        let frames = self.frames_in(samples.len())?;
        if frames == 0 {
            return Ok(());
        }
        self.scratch.clear();
        self.scratch.extend(samples.iter().map(|s| s.to_f32()));
        self.engine.put(&self.scratch, frames);
        self.pending_input = true;
        tracing::trace!("put {} frames ({:?})", frames, S::FORMAT);
        Ok(())
    }

    fn receive_converted<S: Sample>(&mut self, output: &mut [S]) -> usize {
        let channels = self.channels as usize;
        let max_frames = output.len() / channels;
        if max_frames == 0 {
            return 0;
        }
        self.scratch.clear();
        self.scratch.resize(max_frames * channels, 0.0);
        let frames = self.engine.receive(&mut self.scratch, max_frames);
        format::convert_into(&self.scratch[..frames * channels], output);
        frames
    }

    fn frames_in(&self, len: usize) -> Result<usize> {
        let channels = self.channels as usize;
        if len % channels != 0 {
            return Err(Error::InvalidSampleCount {
                count: len as i64,
                channels: self.channels,
            });
        }
        Ok(len / channels)
    }
}

impl Drop for PitchShifter {
    fn drop(&mut self) {
        tracing::debug!(
            "Released pitch shifter ({} Hz, {} channel(s))",
            self.sample_rate,
            self.channels
        );
    }
}

impl std::fmt::Debug for PitchShifter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PitchShifter")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("pitch_semitones", &self.pitch_semitones)
            .field("tempo", &self.tempo)
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PitchShifter`].
///
/// # Example
///
/// ```ignore
/// use semitone_stretch::PitchShifter;
///
/// let shifter = PitchShifter::builder()
///     .sample_rate(48000)
///     .channels(2)
///     .pitch_semitones(-3.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PitchShifterBuilder {
    config: ShifterConfig,
}

impl PitchShifterBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config = self.config.sample_rate(sample_rate);
        self
    }

    /// Default: 2
    pub fn channels(mut self, channels: u32) -> Self {
        self.config = self.config.channels(channels);
        self
    }

    pub fn pitch_semitones(mut self, semitones: f32) -> Self {
        self.config = self.config.pitch_semitones(semitones);
        self
    }

    pub fn tempo(mut self, tempo: f32) -> Self {
        self.config = self.config.tempo(tempo);
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.config = self.config.rate(rate);
        self
    }

    pub fn settings(mut self, settings: StretchSettings) -> Self {
        self.config = self.config.settings(settings);
        self
    }

    pub fn build(self) -> Result<PitchShifter> {
        PitchShifter::with_config(self.config)
    }
}
