//! Process-global registry mapping integer handles to processing contexts.
//!
//! Foreign callers can only hold an integer, so contexts live here and are
//! addressed by [`Handle`]. Ids come from a monotonic counter and are never
//! reused: once destroyed, a handle stays invalid forever, which turns
//! double-destroy and use-after-destroy into [`Error::InvalidHandle`].
//!
//! # Concurrency
//!
//! - Each context sits behind its own `Mutex`, so calls on one handle are
//!   serialized while different handles proceed in parallel.
//! - Lookups clone the context's `Arc` out of the map and release the shard
//!   before locking, so a long call never blocks `create`/`destroy`.
//! - A context destroyed while another thread is mid-call is released when
//!   that call returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::Mutex;
use semitone_core::config::validate_format;
use semitone_core::{Error, Result, ShifterConfig};
use semitone_stretch::PitchShifter;

/// Opaque, non-zero identifier of a registered context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    /// Never issued; returned by failed creates at the C boundary
    pub const NULL: Handle = Handle(0);

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Handle-addressed store of pitch shifters.
pub struct Registry {
    contexts: DashMap<u64, Arc<Mutex<PitchShifter>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registry backing the C and JNI exports.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Create a context from raw caller-supplied values.
    pub fn create(&self, sample_rate: i64, channels: i64) -> Result<Handle> {
        let (sample_rate, channels) = validate_format(sample_rate, channels)?;
        self.create_with_config(ShifterConfig::new(sample_rate, channels))
    }

    pub fn create_with_config(&self, config: ShifterConfig) -> Result<Handle> {
        let shifter = PitchShifter::with_config(config)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.contexts.insert(id, Arc::new(Mutex::new(shifter)));
        tracing::debug!("Registered context {}", id);
        Ok(Handle(id))
    }

    /// Release a context. A second call with the same handle fails.
    pub fn destroy(&self, handle: Handle) -> Result<()> {
        let (_, shifter) = self
            .contexts
            .remove(&handle.0)
            .ok_or(Error::InvalidHandle(handle.0))?;
        match Arc::try_unwrap(shifter) {
            Ok(shifter) => shifter.into_inner().destroy(),
            Err(_) => tracing::debug!("Context {} still in use, released after its call", handle.0),
        }
        tracing::debug!("Destroyed context {}", handle.0);
        Ok(())
    }

    /// Run `f` with exclusive access to the context behind `handle`.
    pub fn with<R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&mut PitchShifter) -> Result<R>,
    ) -> Result<R> {
        let entry = self
            .contexts
            .get(&handle.0)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::InvalidHandle(handle.0))?;
        let mut shifter = entry.lock();
        f(&mut shifter)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.contexts.contains_key(&handle.0)
    }

    /// Number of live contexts
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn set_pitch_semitones(&self, handle: Handle, semitones: f32) -> Result<f32> {
        self.with(handle, |s| s.set_pitch_semitones(semitones))
    }

    pub fn set_tempo(&self, handle: Handle, tempo: f32) -> Result<f32> {
        self.with(handle, |s| s.set_tempo(tempo))
    }

    pub fn set_rate(&self, handle: Handle, rate: f32) -> Result<f32> {
        self.with(handle, |s| s.set_rate(rate))
    }

    pub fn pitch_semitones(&self, handle: Handle) -> Result<f32> {
        self.with(handle, |s| Ok(s.pitch_semitones()))
    }

    pub fn tempo(&self, handle: Handle) -> Result<f32> {
        self.with(handle, |s| Ok(s.tempo()))
    }

    pub fn rate(&self, handle: Handle) -> Result<f32> {
        self.with(handle, |s| Ok(s.rate()))
    }

    pub fn channels(&self, handle: Handle) -> Result<u32> {
        self.with(handle, |s| Ok(s.channels()))
    }

    pub fn put_samples(&self, handle: Handle, samples: &[f32]) -> Result<()> {
        self.with(handle, |s| s.put_samples(samples))
    }

    pub fn put_samples_i16(&self, handle: Handle, samples: &[i16]) -> Result<()> {
        self.with(handle, |s| s.put_samples_i16(samples))
    }

    pub fn receive_samples(&self, handle: Handle, output: &mut [f32]) -> Result<usize> {
        self.with(handle, |s| Ok(s.receive_samples(output)))
    }

    pub fn receive_samples_i16(&self, handle: Handle, output: &mut [i16]) -> Result<usize> {
        self.with(handle, |s| Ok(s.receive_samples_i16(output)))
    }

    pub fn flush(&self, handle: Handle) -> Result<()> {
        self.with(handle, |s| {
            s.flush();
            Ok(())
        })
    }

    pub fn flush_and_receive_samples(&self, handle: Handle, output: &mut [f32]) -> Result<usize> {
        self.with(handle, |s| Ok(s.flush_and_receive_samples(output)))
    }

    pub fn clear(&self, handle: Handle) -> Result<()> {
        self.with(handle, |s| {
            s.clear();
            Ok(())
        })
    }

    pub fn unprocessed_frames(&self, handle: Handle) -> Result<usize> {
        self.with(handle, |s| Ok(s.unprocessed_frames()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_destroy() {
        let registry = Registry::new();
        let handle = registry.create(44100, 1).unwrap();
        assert!(!handle.is_null());
        assert!(registry.contains(handle));
        assert_eq!(registry.len(), 1);

        registry.destroy(handle).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_double_destroy_fails() {
        let registry = Registry::new();
        let handle = registry.create(44100, 2).unwrap();
        registry.destroy(handle).unwrap();
        assert_eq!(
            registry.destroy(handle),
            Err(Error::InvalidHandle(handle.as_raw()))
        );
    }

    #[test]
    fn test_use_after_destroy_fails() {
        let registry = Registry::new();
        let handle = registry.create(44100, 2).unwrap();
        registry.destroy(handle).unwrap();
        assert_eq!(
            registry.set_pitch_semitones(handle, 1.0),
            Err(Error::InvalidHandle(handle.as_raw()))
        );
        assert!(registry.flush(handle).is_err());
        assert!(registry.receive_samples(handle, &mut [0.0; 8]).is_err());
    }

    #[test]
    fn test_handles_are_never_reused() {
        let registry = Registry::new();
        let first = registry.create(44100, 1).unwrap();
        registry.destroy(first).unwrap();
        let second = registry.create(44100, 1).unwrap();
        assert_ne!(first, second);
        assert!(!registry.contains(first));
    }

    #[test]
    fn test_null_handle_is_invalid() {
        let registry = Registry::new();
        assert_eq!(
            registry.flush(Handle::NULL),
            Err(Error::InvalidHandle(0))
        );
    }

    #[test]
    fn test_create_rejects_bad_format() {
        let registry = Registry::new();
        assert_eq!(registry.create(-44100, 1), Err(Error::InvalidSampleRate(-44100)));
        assert_eq!(registry.create(44100, 99), Err(Error::InvalidChannels(99)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_busy_handle_does_not_block_other_handles() {
        let registry = Registry::new();
        let busy = registry.create(44100, 1).unwrap();
        let other = registry.create(44100, 1).unwrap();

        registry
            .with(busy, |_| {
                // Enough ids to land in every shard.
                let handles: Vec<_> = (0..128).map(|_| registry.create(44100, 1).unwrap()).collect();
                for handle in handles {
                    registry.destroy(handle)?;
                }
                registry.destroy(other)
            })
            .unwrap();

        assert!(registry.contains(busy));
        assert!(!registry.contains(other));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_destroy_during_call_releases_afterwards() {
        let registry = Registry::new();
        let handle = registry.create(44100, 1).unwrap();

        let channels = registry
            .with(handle, |s| {
                registry.destroy(handle)?;
                Ok(s.channels())
            })
            .unwrap();

        assert_eq!(channels, 1);
        assert!(registry.is_empty());
        assert!(registry.flush(handle).is_err());
    }

    #[test]
    fn test_applied_values_are_readable() {
        let registry = Registry::new();
        let handle = registry.create(44100, 2).unwrap();

        assert_eq!(registry.set_pitch_semitones(handle, 30.0), Ok(24.0));
        assert_eq!(registry.pitch_semitones(handle), Ok(24.0));
        assert_eq!(registry.set_tempo(handle, 0.1), Ok(0.25));
        assert_eq!(registry.tempo(handle), Ok(0.25));
        assert_eq!(registry.set_rate(handle, 2.0), Ok(2.0));
        assert_eq!(registry.rate(handle), Ok(2.0));

        registry.destroy(handle).unwrap();
        assert!(registry.pitch_semitones(handle).is_err());
    }

    #[test]
    fn test_concurrent_handles() {
        let registry = std::sync::Arc::new(Registry::new());
        let threads: Vec<_> = (0..4)
            .map(|i| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || {
                    let handle = registry.create(44100, 1).unwrap();
                    registry.set_pitch_semitones(handle, i as f32).unwrap();
                    registry.put_samples(handle, &[0.0; 2048]).unwrap();
                    let mut out = [0.0f32; 256];
                    while registry.flush_and_receive_samples(handle, &mut out).unwrap() > 0 {}
                    registry.destroy(handle).unwrap();
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
