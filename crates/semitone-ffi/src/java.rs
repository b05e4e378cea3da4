//! JNI exports for `dev.semitone.PitchShifter`.
//!
//! Expected Java declarations:
//!
//! ```java
//! package dev.semitone;
//!
//! public final class PitchShifter {
//!     static native long nativeCreate(int sampleRate, int channels);
//!     static native void nativeDestroy(long handle);
//!     static native float nativeSetPitchSemiTones(long handle, float semitones);
//!     static native float nativeSetTempo(long handle, float tempo);
//!     static native float nativeSetRate(long handle, float rate);
//!     static native void nativePutSamples(long handle, float[] samples, int frames);
//!     static native void nativePutSamplesPcm16(long handle, short[] samples, int frames);
//!     static native int nativeReceiveSamples(long handle, float[] output, int maxFrames);
//!     static native int nativeReceiveSamplesPcm16(long handle, short[] output, int maxFrames);
//!     static native void nativeFlush(long handle);
//!     static native int nativeFlushAndReceiveSamples(long handle, float[] output, int maxFrames);
//!     static native int nativeFlushAndReceiveSamplesPcm16(long handle, short[] output, int maxFrames);
//!     static native void nativeClear(long handle);
//!     static native int nativeUnprocessedFrames(long handle);
//! }
//! ```
//!
//! Setters return the applied (clamped) value. Array lengths are checked
//! against `frames * channels`. Failures throw `IllegalStateException` for a
//! dead handle and `IllegalArgumentException` otherwise; the native call then
//! returns 0.

use std::panic::{self, AssertUnwindSafe};

use jni::objects::{JClass, JFloatArray, JShortArray};
use jni::sys::{jfloat, jint, jlong};
use jni::JNIEnv;
use semitone_core::{Error, Sample};
use semitone_stretch::PitchShifter;

use crate::buffer;
use crate::error::{FfiError, Result};
use crate::registry::{Handle, Registry};
use crate::status;

fn throw(env: &mut JNIEnv, op: &'static str, err: &FfiError) {
    status::record(op, err);
    let class = match err {
        FfiError::Core(Error::InvalidHandle(_)) => "java/lang/IllegalStateException",
        _ => "java/lang/IllegalArgumentException",
    };
    if let Err(e) = env.throw_new(class, err.to_string()) {
        tracing::error!("{}: failed to throw {}: {}", op, class, e);
    }
}

fn jni_call<R: Default>(
    env: &mut JNIEnv,
    op: &'static str,
    f: impl FnOnce(&mut JNIEnv) -> Result<R>,
) -> R {
    match panic::catch_unwind(AssertUnwindSafe(|| f(env))) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            throw(env, op, &err);
            R::default()
        }
        Err(_) => {
            throw(env, op, &FfiError::Panic(op));
            R::default()
        }
    }
}

#[inline]
fn handle(raw: jlong) -> Handle {
    Handle::from_raw(raw as u64)
}

/// Sample types with a Java array counterpart (`float[]`, `short[]`).
trait JavaSample: Sample {
    fn put(shifter: &mut PitchShifter, samples: &[Self]) -> semitone_core::Result<()>;

    fn receive(shifter: &mut PitchShifter, output: &mut [Self]) -> usize;
}

impl JavaSample for f32 {
    fn put(shifter: &mut PitchShifter, samples: &[Self]) -> semitone_core::Result<()> {
        shifter.put_samples(samples)
    }

    fn receive(shifter: &mut PitchShifter, output: &mut [Self]) -> usize {
        shifter.receive_samples(output)
    }
}

impl JavaSample for i16 {
    fn put(shifter: &mut PitchShifter, samples: &[Self]) -> semitone_core::Result<()> {
        shifter.put_samples_i16(samples)
    }

    fn receive(shifter: &mut PitchShifter, output: &mut [Self]) -> usize {
        shifter.receive_samples_i16(output)
    }
}

/// Checked sample count for `frames` against an array of `array_len` elements.
fn checked_len(frames: jint, channels: u32, array_len: i32) -> Result<usize> {
    let len = buffer::sample_len(frames as i64, channels)?;
    if len > array_len.max(0) as usize {
        return Err(Error::InvalidSampleCount {
            count: frames as i64,
            channels,
        }
        .into());
    }
    Ok(len)
}

/// Validate in boundary order (handle, then array, then count) and return the
/// context's channel count with the sample count to transfer.
///
/// `array_len` is `None` for a null Java array.
fn transfer_len(
    registry: &Registry,
    raw: jlong,
    frames: jint,
    array_len: Option<i32>,
) -> Result<(u32, usize)> {
    let channels = registry.channels(handle(raw))?;
    let array_len = array_len.ok_or(Error::NullBuffer)?;
    Ok((channels, checked_len(frames, channels, array_len)?))
}

/// Copy `frames` frames out of the Java array with `read`, then submit them.
fn put_with<S: JavaSample>(
    registry: &Registry,
    raw: jlong,
    frames: jint,
    array_len: Option<i32>,
    read: impl FnOnce(&mut [S]) -> Result<()>,
) -> Result<()> {
    let (_, len) = transfer_len(registry, raw, frames, array_len)?;
    let mut input = vec![S::default(); len];
    read(&mut input)?;
    Ok(registry.with(handle(raw), |s| S::put(s, &input))?)
}

/// Receive up to `max_frames` frames, optionally flushing first, and hand the
/// written samples to `write`. Returns the frame count.
fn receive_with<S: JavaSample>(
    registry: &Registry,
    raw: jlong,
    max_frames: jint,
    array_len: Option<i32>,
    flush: bool,
    write: impl FnOnce(&[S]) -> Result<()>,
) -> Result<jint> {
    let (channels, len) = transfer_len(registry, raw, max_frames, array_len)?;
    let mut output = vec![S::default(); len];
    let frames = registry.with(handle(raw), |s| {
        if flush {
            s.flush();
        }
        Ok(S::receive(s, &mut output))
    })?;
    write(&output[..frames * channels as usize])?;
    Ok(frames as jint)
}

fn float_len(env: &JNIEnv, array: &JFloatArray) -> Result<Option<i32>> {
    if array.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_array_length(array)?))
}

fn short_len(env: &JNIEnv, array: &JShortArray) -> Result<Option<i32>> {
    if array.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_array_length(array)?))
}

fn receive_floats(
    env: &mut JNIEnv,
    raw: jlong,
    output: &JFloatArray,
    max_frames: jint,
    flush: bool,
) -> Result<jint> {
    let array_len = float_len(env, output)?;
    receive_with(Registry::global(), raw, max_frames, array_len, flush, |out: &[f32]| {
        Ok(env.set_float_array_region(output, 0, out)?)
    })
}

fn receive_shorts(
    env: &mut JNIEnv,
    raw: jlong,
    output: &JShortArray,
    max_frames: jint,
    flush: bool,
) -> Result<jint> {
    let array_len = short_len(env, output)?;
    receive_with(Registry::global(), raw, max_frames, array_len, flush, |out: &[i16]| {
        Ok(env.set_short_array_region(output, 0, out)?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeCreate<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    sample_rate: jint,
    channels: jint,
) -> jlong {
    jni_call(&mut env, "nativeCreate", |_| {
        let handle = Registry::global().create(sample_rate as i64, channels as i64)?;
        Ok(handle.as_raw() as jlong)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeDestroy<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
) {
    jni_call(&mut env, "nativeDestroy", |_| {
        Ok(Registry::global().destroy(handle(raw))?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeSetPitchSemiTones<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    semitones: jfloat,
) -> jfloat {
    jni_call(&mut env, "nativeSetPitchSemiTones", |_| {
        Ok(Registry::global().set_pitch_semitones(handle(raw), semitones)?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeSetTempo<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    tempo: jfloat,
) -> jfloat {
    jni_call(&mut env, "nativeSetTempo", |_| {
        Ok(Registry::global().set_tempo(handle(raw), tempo)?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeSetRate<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    rate: jfloat,
) -> jfloat {
    jni_call(&mut env, "nativeSetRate", |_| {
        Ok(Registry::global().set_rate(handle(raw), rate)?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativePutSamples<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    samples: JFloatArray<'local>,
    frames: jint,
) {
    jni_call(&mut env, "nativePutSamples", |env| {
        let array_len = float_len(env, &samples)?;
        put_with(Registry::global(), raw, frames, array_len, |buf: &mut [f32]| {
            Ok(env.get_float_array_region(&samples, 0, buf)?)
        })
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativePutSamplesPcm16<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    samples: JShortArray<'local>,
    frames: jint,
) {
    jni_call(&mut env, "nativePutSamplesPcm16", |env| {
        let array_len = short_len(env, &samples)?;
        put_with(Registry::global(), raw, frames, array_len, |buf: &mut [i16]| {
            Ok(env.get_short_array_region(&samples, 0, buf)?)
        })
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeReceiveSamples<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    output: JFloatArray<'local>,
    max_frames: jint,
) -> jint {
    jni_call(&mut env, "nativeReceiveSamples", |env| {
        receive_floats(env, raw, &output, max_frames, false)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeReceiveSamplesPcm16<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    output: JShortArray<'local>,
    max_frames: jint,
) -> jint {
    jni_call(&mut env, "nativeReceiveSamplesPcm16", |env| {
        receive_shorts(env, raw, &output, max_frames, false)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeFlush<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
) {
    jni_call(&mut env, "nativeFlush", |_| {
        Ok(Registry::global().flush(handle(raw))?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeFlushAndReceiveSamples<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    output: JFloatArray<'local>,
    max_frames: jint,
) -> jint {
    jni_call(&mut env, "nativeFlushAndReceiveSamples", |env| {
        receive_floats(env, raw, &output, max_frames, true)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeFlushAndReceiveSamplesPcm16<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
    output: JShortArray<'local>,
    max_frames: jint,
) -> jint {
    jni_call(&mut env, "nativeFlushAndReceiveSamplesPcm16", |env| {
        receive_shorts(env, raw, &output, max_frames, true)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeClear<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
) {
    jni_call(&mut env, "nativeClear", |_| {
        Ok(Registry::global().clear(handle(raw))?)
    })
}

#[no_mangle]
pub extern "system" fn Java_dev_semitone_PitchShifter_nativeUnprocessedFrames<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    raw: jlong,
) -> jint {
    jni_call(&mut env, "nativeUnprocessedFrames", |_| {
        let frames = Registry::global().unprocessed_frames(handle(raw))?;
        Ok(i32::try_from(frames).unwrap_or(i32::MAX))
    })
}
