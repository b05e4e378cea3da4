//! # semitone - Pitch-shifting contexts for foreign runtimes
//!
//! Safe ownership, sample-format conversion and FFI exports around the
//! SoundTouch time-stretch/pitch-shift processor.
//!
//! ## Architecture
//!
//! semitone is an umbrella crate that coordinates:
//! - **semitone-core** - Errors, PCM16/float32 conversion, configuration
//! - **semitone-stretch** - Owned `PitchShifter` processing context
//! - **semitone-ffi** - Handle registry, C ABI and JNI exports
//!
//! ## Quick Start
//!
//! ```ignore
//! use semitone::prelude::*;
//!
//! let mut shifter = PitchShifter::builder()
//!     .sample_rate(44100)
//!     .channels(1)
//!     .pitch_semitones(2.0)
//!     .build()?;
//!
//! shifter.put_samples(&input)?;
//! let mut out = vec![0.0; 512];
//! while shifter.receive_samples(&mut out) > 0 { /* ... */ }
//! while shifter.flush_and_receive_samples(&mut out) > 0 { /* ... */ }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Safe API plus C ABI exports
//! - `ffi` - Handle registry and `semitone_*` C functions
//! - `jni` - `Java_dev_semitone_PitchShifter_*` exports

/// Re-export of semitone-core for direct access
pub use semitone_core as core;

pub use semitone_core::format;
pub use semitone_core::{Sample, SampleFormat, ShifterConfig, StretchSettings};
pub use semitone_stretch::{PitchShifter, PitchShifterBuilder};

#[cfg(feature = "ffi")]
pub use semitone_ffi as ffi;

#[cfg(feature = "ffi")]
pub use semitone_ffi::{Handle, Registry, StatusCode};

mod error;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{
        Error, PitchShifter, PitchShifterBuilder, Result, Sample, SampleFormat, ShifterConfig,
        StretchSettings,
    };

    #[cfg(feature = "ffi")]
    pub use crate::{Handle, Registry, StatusCode};
}
