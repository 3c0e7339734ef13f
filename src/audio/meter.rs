//! Lock-free live audio metrics.
//!
//! The capture path publishes a fresh snapshot per frame through atomics so
//! `AudioProcessor::metrics()` can be polled every animation frame without
//! touching a lock or the audio thread.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

const SILENCE_FLOOR_DB: f32 = -60.0;
const CLIP_THRESHOLD: f32 = 0.985;

/// Point-in-time audio quality snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetrics {
    /// Normalized loudness, 0.0 (silence floor) to 1.0 (full scale).
    pub volume: f32,
    pub signal_to_noise_ratio: f32,
    pub clipping: bool,
    pub latency_ms: u64,
    pub buffer_underrun: bool,
}

impl Default for AudioMetrics {
    fn default() -> Self {
        Self {
            volume: 0.0,
            signal_to_noise_ratio: 0.0,
            clipping: false,
            latency_ms: 0,
            buffer_underrun: false,
        }
    }
}

/// Shared handle publishing the most recent frame's metrics.
#[derive(Clone, Debug, Default)]
pub struct LiveMetrics {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    volume_bits: AtomicU32,
    snr_bits: AtomicU32,
    clipping: AtomicBool,
    latency_ms: AtomicU64,
    underrun: AtomicBool,
}

impl LiveMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn publish_frame(&self, volume: f32, snr: f32, clipping: bool) {
        self.inner.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
        self.inner.snr_bits.store(snr.to_bits(), Ordering::Relaxed);
        self.inner.clipping.store(clipping, Ordering::Relaxed);
        self.inner.underrun.store(false, Ordering::Relaxed);
    }

    pub(crate) fn set_latency_ms(&self, latency_ms: u64) {
        self.inner.latency_ms.store(latency_ms, Ordering::Relaxed);
    }

    pub(crate) fn mark_underrun(&self) {
        self.inner.underrun.store(true, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.inner.volume_bits.store(0f32.to_bits(), Ordering::Relaxed);
        self.inner.snr_bits.store(0f32.to_bits(), Ordering::Relaxed);
        self.inner.clipping.store(false, Ordering::Relaxed);
        self.inner.latency_ms.store(0, Ordering::Relaxed);
        self.inner.underrun.store(false, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AudioMetrics {
        AudioMetrics {
            volume: f32::from_bits(self.inner.volume_bits.load(Ordering::Relaxed)),
            signal_to_noise_ratio: f32::from_bits(self.inner.snr_bits.load(Ordering::Relaxed)),
            clipping: self.inner.clipping.load(Ordering::Relaxed),
            latency_ms: self.inner.latency_ms.load(Ordering::Relaxed),
            buffer_underrun: self.inner.underrun.load(Ordering::Relaxed),
        }
    }
}

/// RMS energy of a frame in dBFS, floored for empty or silent input.
pub(crate) fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return SILENCE_FLOOR_DB;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let rms = energy.sqrt().max(1e-6);
    (20.0 * rms.log10()).max(SILENCE_FLOOR_DB)
}

/// Map dBFS loudness onto the 0..1 volume scale.
pub(crate) fn volume_from_db(db: f32) -> f32 {
    ((db - SILENCE_FLOOR_DB) / -SILENCE_FLOOR_DB).clamp(0.0, 1.0)
}

pub(crate) fn is_clipping(samples: &[f32]) -> bool {
    samples.iter().any(|s| s.abs() >= CLIP_THRESHOLD)
}
