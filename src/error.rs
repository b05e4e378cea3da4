//! Centralized error type for the semitone umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] semitone_core::Error),

    #[cfg(feature = "ffi")]
    #[error("FFI: {0}")]
    Ffi(#[from] semitone_ffi::FfiError),
}

pub type Result<T> = std::result::Result<T, Error>;
