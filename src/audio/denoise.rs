//! Frequency-domain spectral subtraction.
//!
//! Each frame is transformed with an FFT, a scaled estimate of the learned
//! noise floor is subtracted from every bin's magnitude (floored at zero),
//! and the frame is rebuilt from the reduced magnitudes and the original
//! phases. [`AdaptiveDenoiser`] additionally tracks slowly-changing
//! background noise with a per-bin exponential moving average updated on
//! non-speech frames.

use super::meter::rms_db;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Frames quieter than this are treated as non-speech for noise adaptation.
const NOISE_CLASS_THRESHOLD_DB: f32 = -45.0;

/// `noise_reduction_level` 1.0 maps to subtracting twice the floor estimate.
const MAX_OVERSUBTRACTION: f32 = 2.0;

/// Fixed-profile spectral subtraction over frames of one FFT length.
pub struct SpectralDenoiser {
    fft_len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    noise_floor: Vec<f32>,
    level: f32,
    scratch: Vec<Complex<f32>>,
}

impl SpectralDenoiser {
    /// `fft_len` must be the frame length; `level` is the over-subtraction
    /// control in 0.0..=1.0.
    pub fn new(fft_len: usize, level: f32) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_len,
            forward: planner.plan_fft_forward(fft_len),
            inverse: planner.plan_fft_inverse(fft_len),
            noise_floor: vec![0.0; fft_len],
            level: level.clamp(0.0, 1.0),
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
        }
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Overwrite the noise profile from a frame known to contain only noise.
    pub fn learn_noise(&mut self, frame: &[f32]) {
        let spectrum = self.spectrum_of(frame);
        for (floor, bin) in self.noise_floor.iter_mut().zip(&spectrum) {
            *floor = bin.norm();
        }
    }

    pub(super) fn update_noise_ema(&mut self, frame: &[f32], rate: f32) {
        let spectrum = self.spectrum_of(frame);
        let rate = rate.clamp(0.0, 1.0);
        for (floor, bin) in self.noise_floor.iter_mut().zip(&spectrum) {
            *floor = (1.0 - rate) * *floor + rate * bin.norm();
        }
    }

    /// Subtract the scaled noise floor from `frame` in place. Frames shorter
    /// than the FFT length are zero-padded for the transform and truncated
    /// back afterwards.
    pub fn process(&mut self, frame: &mut [f32]) {
        let input_len = frame.len().min(self.fft_len);
        self.load_frame(frame);
        self.forward.process(&mut self.scratch);

        let alpha = self.level * MAX_OVERSUBTRACTION;
        for (bin, floor) in self.scratch.iter_mut().zip(&self.noise_floor) {
            let magnitude = bin.norm();
            let reduced = (magnitude - alpha * floor).max(0.0);
            if magnitude > 0.0 {
                // Keep the original phase, scale the magnitude down.
                *bin *= reduced / magnitude;
            }
        }

        self.inverse.process(&mut self.scratch);
        let norm = 1.0 / self.fft_len as f32;
        for (sample, bin) in frame[..input_len].iter_mut().zip(&self.scratch) {
            *sample = bin.re * norm;
        }
    }

    fn load_frame(&mut self, frame: &[f32]) {
        let input_len = frame.len().min(self.fft_len);
        for (slot, sample) in self.scratch[..input_len].iter_mut().zip(frame) {
            *slot = Complex::new(*sample, 0.0);
        }
        for slot in self.scratch[input_len..].iter_mut() {
            *slot = Complex::new(0.0, 0.0);
        }
    }

    fn spectrum_of(&mut self, frame: &[f32]) -> Vec<Complex<f32>> {
        self.load_frame(frame);
        self.forward.process(&mut self.scratch);
        self.scratch.clone()
    }
}

/// Spectral subtraction with a self-updating noise profile.
///
/// Frames classified as non-speech (below a fixed energy threshold) feed the
/// per-bin EMA, so the profile follows fans spinning up, rain, or other
/// slowly-changing background noise without an explicit calibration step.
pub struct AdaptiveDenoiser {
    inner: SpectralDenoiser,
    adaptation_rate: f32,
}

impl AdaptiveDenoiser {
    pub fn new(fft_len: usize, level: f32, adaptation_rate: f32) -> Self {
        Self {
            inner: SpectralDenoiser::new(fft_len, level),
            adaptation_rate: adaptation_rate.clamp(0.0, 1.0),
        }
    }

    pub fn set_level(&mut self, level: f32) {
        self.inner.set_level(level);
    }

    pub fn process(&mut self, frame: &mut [f32]) {
        if rms_db(frame) < NOISE_CLASS_THRESHOLD_DB {
            self.inner.update_noise_ema(frame, self.adaptation_rate);
        }
        self.inner.process(frame);
    }
}
