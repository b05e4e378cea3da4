//! Raw pointer to slice conversion, validated once at the boundary.

use std::slice;

use semitone_core::{Error, Result};

/// Interleaved sample count for `frames` frames, rejecting negative counts
/// and overflow.
pub(crate) fn sample_len(frames: i64, channels: u32) -> Result<usize> {
    let invalid = || Error::InvalidSampleCount {
        count: frames,
        channels,
    };
    let frames = usize::try_from(frames).map_err(|_| invalid())?;
    frames.checked_mul(channels as usize).ok_or_else(invalid)
}

/// # Safety
/// If `ptr` is non-null it must be valid for reads of `frames * channels`
/// values for the returned lifetime.
pub(crate) unsafe fn input<'a, T>(ptr: *const T, frames: i32, channels: u32) -> Result<&'a [T]> {
    if ptr.is_null() && frames != 0 {
        return Err(Error::NullBuffer);
    }
    let len = sample_len(frames as i64, channels)?;
    if len == 0 {
        return Ok(&[]);
    }
    Ok(slice::from_raw_parts(ptr, len))
}

/// # Safety
/// If `ptr` is non-null it must be valid for writes of `frames * channels`
/// values for the returned lifetime, with no other live references.
pub(crate) unsafe fn output<'a, T>(ptr: *mut T, frames: i32, channels: u32) -> Result<&'a mut [T]> {
    if ptr.is_null() && frames != 0 {
        return Err(Error::NullBuffer);
    }
    let len = sample_len(frames as i64, channels)?;
    if len == 0 {
        return Ok(&mut []);
    }
    Ok(slice::from_raw_parts_mut(ptr, len))
}
