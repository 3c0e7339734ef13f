//! Capture-callback plumbing.
//!
//! The device hands the chopper interleaved samples in whatever channel
//! count, sample type, and rate the hardware runs at; the chopper downmixes
//! to mono, resamples to the pipeline rate, and emits exact frames on a
//! bounded channel. The device callback must never block, so a full channel
//! drops the frame and counts it.

use crossbeam_channel::{Sender, TrySendError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Turns raw device input into pipeline-rate mono frames.
///
/// Frame geometry is fixed at construction: `frame_samples` output samples
/// per frame, produced from `device_block` input samples. Everything past
/// the last whole block stays pending for the next callback.
pub(super) struct FrameChopper {
    frame_samples: usize,
    device_rate: u32,
    target_rate: u32,
    device_block: usize,
    pending: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
}

impl FrameChopper {
    pub(super) fn new(
        frame_samples: usize,
        device_rate: u32,
        target_rate: u32,
        sender: Sender<Vec<f32>>,
        dropped: Arc<AtomicUsize>,
    ) -> Self {
        let frame_samples = frame_samples.max(1);
        let device_block = ((frame_samples as u64 * u64::from(device_rate))
            / u64::from(target_rate.max(1)))
        .max(1) as usize;
        Self {
            frame_samples,
            device_rate,
            target_rate,
            device_block,
            pending: Vec::with_capacity(device_block * 2),
            sender,
            dropped,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, mut convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        if channels <= 1 {
            self.pending.extend(data.iter().copied().map(&mut convert));
        } else {
            // Downmix by averaging each interleaved group; a trailing
            // partial group still averages over what it has.
            for group in data.chunks(channels) {
                let sum: f32 = group.iter().copied().map(&mut convert).sum();
                self.pending.push(sum / group.len() as f32);
            }
        }

        while self.pending.len() >= self.device_block {
            let block: Vec<f32> = self.pending.drain(..self.device_block).collect();
            let mut frame = resample_linear(&block, self.device_rate, self.target_rate);
            frame.resize(self.frame_samples, 0.0);
            match self.sender.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Linear-interpolation resampler, adequate for metering and spectral work.
pub(super) fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let left = pos.floor() as usize;
        let frac = (pos - pos.floor()) as f32;
        let a = samples[left.min(samples.len() - 1)];
        let b = samples[(left + 1).min(samples.len() - 1)];
        out.push(a + (b - a) * frac);
    }
    out
}
