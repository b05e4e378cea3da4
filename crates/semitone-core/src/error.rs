//! Error types for semitone-core.

use thiserror::Error;

/// Error type for processing contexts and the boundary layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid handle: {0}")]
    InvalidHandle(u64),

    #[error("Null sample buffer")]
    NullBuffer,

    #[error("Invalid sample count: {count} (channels={channels})")]
    InvalidSampleCount { count: i64, channels: u32 },

    #[error("Invalid sample rate: {0}. Must be between 1 and 384000 Hz")]
    InvalidSampleRate(i64),

    #[error("Invalid channel count: {0}. Must be between 1 and 16")]
    InvalidChannels(i64),

    #[error("Invalid pitch: {0} semitones")]
    InvalidPitch(f32),

    #[error("Invalid tempo: {0}")]
    InvalidTempo(f32),

    #[error("Invalid rate: {0}")]
    InvalidRate(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for semitone-core operations.
pub type Result<T> = std::result::Result<T, Error>;
