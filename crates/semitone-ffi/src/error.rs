//! Error types for the boundary layer.

use thiserror::Error;

/// Error type for FFI entry points.
#[derive(Error, Debug)]
pub enum FfiError {
    #[error(transparent)]
    Core(#[from] semitone_core::Error),

    #[error("Config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("String argument is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[cfg(feature = "jni")]
    #[error("JNI: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("Panic in {0}")]
    Panic(&'static str),
}

/// Result type for FFI entry points.
pub type Result<T> = std::result::Result<T, FfiError>;
