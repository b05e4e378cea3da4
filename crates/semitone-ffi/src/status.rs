//! Status codes and the per-thread last-error message.

use std::cell::RefCell;

use semitone_core::Error;

use crate::error::FfiError;

/// Status returned by every C entry point.
///
/// Count-returning calls return the count (>= 0) on success and one of the
/// negative codes on failure.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 0,
    InvalidHandle = -1,
    NullBuffer = -2,
    InvalidSampleCount = -3,
    InvalidArgument = -4,
    Panic = -5,
}

impl StatusCode {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&FfiError> for StatusCode {
    fn from(err: &FfiError) -> Self {
        match err {
            FfiError::Core(Error::InvalidHandle(_)) => StatusCode::InvalidHandle,
            FfiError::Core(Error::NullBuffer) => StatusCode::NullBuffer,
            FfiError::Core(Error::InvalidSampleCount { .. }) => StatusCode::InvalidSampleCount,
            FfiError::Panic(_) => StatusCode::Panic,
            _ => StatusCode::InvalidArgument,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Log a failed call and remember its message for `semitone_last_error`.
pub(crate) fn record(op: &str, err: &FfiError) -> StatusCode {
    tracing::warn!("{} failed: {}", op, err);
    let message = err.to_string();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
    StatusCode::from(err)
}

/// Message of the most recent failure on this thread.
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
