//! Pitch-shifting processing contexts.
//!
//! Wraps the SoundTouch WSOLA processor in an owned context. The DSP itself
//! lives in SoundTouch; this crate owns its lifetime, validates parameters and
//! converts sample formats at the edges.
//!
//! # Example
//!
//! ```ignore
//! use semitone_stretch::PitchShifter;
//!
//! let mut shifter = PitchShifter::builder()
//!     .sample_rate(44100)
//!     .channels(1)
//!     .pitch_semitones(2.0)
//!     .build()?;
//!
//! let mut output = shifter.process(&input)?;
//! output.extend(shifter.finish());
//! ```
//!
//! # Features
//!
//! - **Owned lifetime**: `destroy(self)` / `Drop` release the processor exactly once
//! - **Two boundary formats**: float32 (canonical) and PCM16 with clamping
//! - **Frame-based counts**: every count is frames, never raw samples

mod engine;
mod shifter;

pub use semitone_core::{Error, Result, Sample, SampleFormat, ShifterConfig, StretchSettings};
pub use shifter::{PitchShifter, PitchShifterBuilder};
