//! Audio capture and preprocessing pipeline.
//!
//! Owns the microphone session, computes per-frame quality metrics, and
//! applies spectral noise reduction before frames reach the active backend.
//! Audio is captured via CPAL, downmixed to mono f32, and chopped into
//! fixed-size frames; metering runs on every frame, at a much higher cadence
//! than recognition results arrive.

/// Engine-internal sample rate for the processing pipeline.
pub const TARGET_RATE: u32 = 16_000;

/// Frame length used for metering and spectral processing.
pub const FRAME_MS: u64 = 32;

mod denoise;
mod dispatch;
mod meter;
mod processor;

pub use denoise::{AdaptiveDenoiser, SpectralDenoiser};
pub use meter::{AudioMetrics, LiveMetrics};
pub use processor::{AudioProcessor, ProcessorConfig};
