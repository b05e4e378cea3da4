//! Boundary layer for foreign callers.
//!
//! # Primary API
//!
//! - [`Registry`] / [`Handle`]: Integer handles for callers that cannot own a Rust value
//! - [`StatusCode`]: Result codes returned across the C ABI
//! - `semitone_*` C exports (see [`c_api`])
//! - `"jni"` feature: `Java_dev_semitone_PitchShifter_*` exports
//!
//! # Example (C)
//!
//! ```c
//! uint64_t h = semitone_create(44100, 1);
//! float applied;
//! semitone_set_pitch_semitones(h, 2.0f, &applied);
//! semitone_put_samples(h, input, 1024);
//!
//! float out[512];
//! int n;
//! while ((n = semitone_receive_samples(h, out, 512)) > 0) { /* ... */ }
//! while ((n = semitone_flush_and_receive_samples(h, out, 512)) > 0) { /* ... */ }
//!
//! semitone_destroy(h);
//! ```

pub mod error;
pub use error::{FfiError, Result};

mod buffer;
pub mod c_api;
pub mod registry;
pub mod status;

#[cfg(feature = "jni")]
pub mod java;

pub use registry::{Handle, Registry};
pub use status::{clear_last_error, last_error_message, StatusCode};
