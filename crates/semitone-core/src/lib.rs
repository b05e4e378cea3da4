//! Core types shared by every semitone crate.
//!
//! # Primary API
//!
//! - [`Error`] / [`Result`]: Failure taxonomy for contexts and the FFI boundary
//! - [`ShifterConfig`] / [`StretchSettings`]: Validated processor configuration
//! - [`format`]: PCM16 <-> float32 conversion and the [`Sample`] trait
//!
//! # Example
//!
//! ```
//! use semitone_core::{format, ShifterConfig};
//!
//! let config = ShifterConfig::new(44100, 2).pitch_semitones(3.0);
//! assert!(config.validate().is_ok());
//!
//! let floats = format::pcm16_to_f32(&[0, 32767, -32767]);
//! assert_eq!(format::f32_to_pcm16(&floats), vec![0, 32767, -32767]);
//! ```

pub mod config;
pub mod error;
pub mod format;

pub use config::{ShifterConfig, StretchSettings};
pub use error::{Error, Result};
pub use format::{Sample, SampleFormat};
