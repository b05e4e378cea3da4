//! C ABI exports.
//!
//! Every function validates its arguments, never unwinds across the boundary
//! and reports failures through a [`StatusCode`]. The message of the last
//! failure on the calling thread is available from [`semitone_last_error`].
//!
//! Counts are frames; buffers are interleaved. Float buffers are the canonical
//! format, `_i16` variants take PCM16 and convert at the boundary.

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};

use semitone_core::ShifterConfig;

use crate::buffer;
use crate::error::{FfiError, Result};
use crate::registry::{Handle, Registry};
use crate::status::{self, StatusCode};

fn guard<R>(op: &'static str, f: impl FnOnce() -> Result<R>) -> std::result::Result<R, StatusCode> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(status::record(op, &err)),
        Err(_) => Err(status::record(op, &FfiError::Panic(op))),
    }
}

fn status_call(op: &'static str, f: impl FnOnce() -> Result<()>) -> i32 {
    match guard(op, f) {
        Ok(()) => StatusCode::Ok.code(),
        Err(code) => code.code(),
    }
}

fn count_call(op: &'static str, f: impl FnOnce() -> Result<usize>) -> i32 {
    match guard(op, f) {
        Ok(count) => i32::try_from(count).unwrap_or(i32::MAX),
        Err(code) => code.code(),
    }
}

fn handle_call(op: &'static str, f: impl FnOnce() -> Result<Handle>) -> u64 {
    guard(op, f).map(Handle::as_raw).unwrap_or(Handle::NULL.as_raw())
}

/// Write `value` through `out` when it is non-null.
unsafe fn store(out: *mut f32, value: f32) {
    if !out.is_null() {
        unsafe { out.write(value) };
    }
}

/// Read one applied value into `out`; `out` must not be null.
unsafe fn value_call(op: &'static str, out: *mut f32, f: impl FnOnce() -> Result<f32>) -> i32 {
    status_call(op, || {
        if out.is_null() {
            return Err(semitone_core::Error::NullBuffer.into());
        }
        let value = f()?;
        unsafe { out.write(value) };
        Ok(())
    })
}

/// Longest prefix of `message` that fits in `max` bytes without splitting a
/// UTF-8 sequence.
fn truncate_utf8(message: &str, max: usize) -> &str {
    if message.len() <= max {
        return message;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Create a processing context.
///
/// Returns a non-zero handle, or 0 if `sample_rate` is outside 1..=384000 or
/// `channels` outside 1..=16.
#[no_mangle]
pub extern "C" fn semitone_create(sample_rate: i32, channels: i32) -> u64 {
    handle_call("semitone_create", || {
        Ok(Registry::global().create(sample_rate as i64, channels as i64)?)
    })
}

/// Create a processing context from a JSON-encoded configuration.
///
/// Missing fields take their defaults, e.g.
/// `{"sample_rate": 48000, "channels": 1, "pitch_semitones": -2.0}`.
///
/// # Safety
/// `config_json` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn semitone_create_with_config(config_json: *const c_char) -> u64 {
    handle_call("semitone_create_with_config", || {
        if config_json.is_null() {
            return Err(semitone_core::Error::NullBuffer.into());
        }
        let json = unsafe { CStr::from_ptr(config_json) }.to_str()?;
        let config: ShifterConfig = serde_json::from_str(json)?;
        Ok(Registry::global().create_with_config(config)?)
    })
}

/// Release a context. Destroying the same handle twice returns
/// `InvalidHandle`.
#[no_mangle]
pub extern "C" fn semitone_destroy(handle: u64) -> i32 {
    status_call("semitone_destroy", || {
        Ok(Registry::global().destroy(Handle::from_raw(handle))?)
    })
}

/// Set the pitch shift in semitones.
///
/// Finite values are clamped to ±24; the applied value is written to
/// `applied` unless it is null.
///
/// # Safety
/// `applied` must be null or valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_set_pitch_semitones(
    handle: u64,
    semitones: f32,
    applied: *mut f32,
) -> i32 {
    status_call("semitone_set_pitch_semitones", || {
        let value = Registry::global().set_pitch_semitones(Handle::from_raw(handle), semitones)?;
        unsafe { store(applied, value) };
        Ok(())
    })
}

/// Set the tempo (clamped to 0.25 - 4.0). The applied value goes to `applied`.
///
/// # Safety
/// `applied` must be null or valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_set_tempo(handle: u64, tempo: f32, applied: *mut f32) -> i32 {
    status_call("semitone_set_tempo", || {
        let value = Registry::global().set_tempo(Handle::from_raw(handle), tempo)?;
        unsafe { store(applied, value) };
        Ok(())
    })
}

/// Set the rate (clamped to 0.25 - 4.0). The applied value goes to `applied`.
///
/// # Safety
/// `applied` must be null or valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_set_rate(handle: u64, rate: f32, applied: *mut f32) -> i32 {
    status_call("semitone_set_rate", || {
        let value = Registry::global().set_rate(Handle::from_raw(handle), rate)?;
        unsafe { store(applied, value) };
        Ok(())
    })
}

/// Current pitch shift in semitones.
///
/// # Safety
/// `out` must be valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_get_pitch_semitones(handle: u64, out: *mut f32) -> i32 {
    unsafe {
        value_call("semitone_get_pitch_semitones", out, || {
            Ok(Registry::global().pitch_semitones(Handle::from_raw(handle))?)
        })
    }
}

/// # Safety
/// `out` must be valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_get_tempo(handle: u64, out: *mut f32) -> i32 {
    unsafe {
        value_call("semitone_get_tempo", out, || {
            Ok(Registry::global().tempo(Handle::from_raw(handle))?)
        })
    }
}

/// # Safety
/// `out` must be valid for a write of one float.
#[no_mangle]
pub unsafe extern "C" fn semitone_get_rate(handle: u64, out: *mut f32) -> i32 {
    unsafe {
        value_call("semitone_get_rate", out, || {
            Ok(Registry::global().rate(Handle::from_raw(handle))?)
        })
    }
}

/// Submit `frames` interleaved float frames.
///
/// # Safety
/// `samples` must be null or valid for reads of `frames * channels` floats.
#[no_mangle]
pub unsafe extern "C" fn semitone_put_samples(handle: u64, samples: *const f32, frames: i32) -> i32 {
    status_call("semitone_put_samples", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let input = unsafe { buffer::input(samples, frames, s.channels())? };
            s.put_samples(input)
        })?)
    })
}

/// Submit `frames` interleaved PCM16 frames.
///
/// # Safety
/// `samples` must be null or valid for reads of `frames * channels` values.
#[no_mangle]
pub unsafe extern "C" fn semitone_put_samples_i16(
    handle: u64,
    samples: *const i16,
    frames: i32,
) -> i32 {
    status_call("semitone_put_samples_i16", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let input = unsafe { buffer::input(samples, frames, s.channels())? };
            s.put_samples_i16(input)
        })?)
    })
}

/// Receive up to `max_frames` processed float frames. Returns the frame count.
///
/// # Safety
/// `output` must be null or valid for writes of `max_frames * channels` floats.
#[no_mangle]
pub unsafe extern "C" fn semitone_receive_samples(
    handle: u64,
    output: *mut f32,
    max_frames: i32,
) -> i32 {
    count_call("semitone_receive_samples", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let out = unsafe { buffer::output(output, max_frames, s.channels())? };
            Ok(s.receive_samples(out))
        })?)
    })
}

/// Receive up to `max_frames` processed frames as PCM16. Returns the frame count.
///
/// # Safety
/// `output` must be null or valid for writes of `max_frames * channels` values.
#[no_mangle]
pub unsafe extern "C" fn semitone_receive_samples_i16(
    handle: u64,
    output: *mut i16,
    max_frames: i32,
) -> i32 {
    count_call("semitone_receive_samples_i16", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let out = unsafe { buffer::output(output, max_frames, s.channels())? };
            Ok(s.receive_samples_i16(out))
        })?)
    })
}

/// Signal end-of-stream.
#[no_mangle]
pub extern "C" fn semitone_flush(handle: u64) -> i32 {
    status_call("semitone_flush", || {
        Ok(Registry::global().flush(Handle::from_raw(handle))?)
    })
}

/// Flush, then receive up to `max_frames` float frames.
///
/// # Safety
/// Same as [`semitone_receive_samples`].
#[no_mangle]
pub unsafe extern "C" fn semitone_flush_and_receive_samples(
    handle: u64,
    output: *mut f32,
    max_frames: i32,
) -> i32 {
    count_call("semitone_flush_and_receive_samples", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let out = unsafe { buffer::output(output, max_frames, s.channels())? };
            Ok(s.flush_and_receive_samples(out))
        })?)
    })
}

/// Flush, then receive up to `max_frames` PCM16 frames.
///
/// # Safety
/// Same as [`semitone_receive_samples_i16`].
#[no_mangle]
pub unsafe extern "C" fn semitone_flush_and_receive_samples_i16(
    handle: u64,
    output: *mut i16,
    max_frames: i32,
) -> i32 {
    count_call("semitone_flush_and_receive_samples_i16", || {
        Ok(Registry::global().with(Handle::from_raw(handle), |s| {
            let out = unsafe { buffer::output(output, max_frames, s.channels())? };
            Ok(s.flush_and_receive_samples_i16(out))
        })?)
    })
}

/// Discard all buffered input and output.
#[no_mangle]
pub extern "C" fn semitone_clear(handle: u64) -> i32 {
    status_call("semitone_clear", || {
        Ok(Registry::global().clear(Handle::from_raw(handle))?)
    })
}

/// Input frames still inside the processing pipeline.
#[no_mangle]
pub extern "C" fn semitone_unprocessed_frames(handle: u64) -> i32 {
    count_call("semitone_unprocessed_frames", || {
        Ok(Registry::global().unprocessed_frames(Handle::from_raw(handle))?)
    })
}

/// Copy the last failure message on this thread into `buf` (NUL-terminated,
/// truncated to fit on a character boundary).
///
/// Returns the full message length in bytes, excluding the terminator, so a
/// call with a null `buf` can size the buffer. Returns 0 if no call has failed.
///
/// # Safety
/// `buf` must be null or valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn semitone_last_error(buf: *mut c_char, len: usize) -> i32 {
    let Some(message) = status::last_error_message() else {
        return 0;
    };
    if !buf.is_null() && len > 0 {
        let copied = truncate_utf8(&message, len - 1).as_bytes();
        let out = unsafe { std::slice::from_raw_parts_mut(buf as *mut u8, len) };
        out[..copied.len()].copy_from_slice(copied);
        out[copied.len()] = 0;
    }
    i32::try_from(message.len()).unwrap_or(i32::MAX)
}
