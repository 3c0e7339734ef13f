//! Microphone capture session and frame conditioning.
//!
//! One `AudioProcessor` owns at most one capture session. Hardware capture
//! goes through CPAL with format conversion and a bounded frame channel; the
//! offline constructor drives the identical conditioning path from PCM fed
//! in by the caller, which is how tests and benchmarks run without a device.

use super::denoise::AdaptiveDenoiser;
use super::dispatch::FrameChopper;
use super::meter::{is_clipping, rms_db, volume_from_db, LiveMetrics};
use super::{AudioMetrics, FRAME_MS, TARGET_RATE};
use crate::error::{RecognitionError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Frames at or below this level update the background-noise estimate.
const NOISE_TRACK_THRESHOLD_DB: f32 = -45.0;
const NOISE_EMA_RATE: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub sample_rate: u32,
    pub frame_ms: u64,
    pub channel_capacity: usize,
    pub noise_reduction: bool,
    pub noise_reduction_level: f32,
    pub adaptation_rate: f32,
    pub preferred_device: Option<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_RATE,
            frame_ms: FRAME_MS,
            channel_capacity: 64,
            noise_reduction: true,
            noise_reduction_level: 0.7,
            adaptation_rate: 0.05,
            preferred_device: None,
        }
    }
}

impl ProcessorConfig {
    fn frame_samples(&self) -> usize {
        ((u64::from(self.sample_rate) * self.frame_ms) / 1000).max(1) as usize
    }
}

enum Source {
    Idle,
    Capture(CaptureSession),
    Offline {
        recording: bool,
        queue: VecDeque<Vec<f32>>,
    },
}

struct CaptureSession {
    // Held for its Drop; pausing happens by dropping the stream.
    _stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
    device_rate: u32,
}

/// Owner of the capture session and the conditioning pipeline.
pub struct AudioProcessor {
    cfg: ProcessorConfig,
    live: LiveMetrics,
    denoiser: AdaptiveDenoiser,
    noise_db: f32,
    source: Source,
}

impl AudioProcessor {
    /// Hardware-capable processor. No device is touched until
    /// `start_recording`.
    pub fn new(cfg: ProcessorConfig) -> Self {
        let denoiser = AdaptiveDenoiser::new(
            cfg.frame_samples(),
            cfg.noise_reduction_level,
            cfg.adaptation_rate,
        );
        Self {
            cfg,
            live: LiveMetrics::new(),
            denoiser,
            noise_db: -60.0,
            source: Source::Idle,
        }
    }

    /// Hardware-free processor fed through [`AudioProcessor::feed_pcm`].
    pub fn offline(cfg: ProcessorConfig) -> Self {
        let mut processor = Self::new(cfg);
        processor.source = Source::Offline {
            recording: false,
            queue: VecDeque::new(),
        };
        processor
    }

    /// Microphone names for device pickers and diagnostics.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|err| classify_device_error(&err.to_string()))?;
        Ok(devices.filter_map(|device| device.name().ok()).collect())
    }

    /// Acquire the microphone and open the analysis pipeline.
    ///
    /// Fails with `NoMicrophone` or `PermissionDenied`; retrying is the
    /// caller's decision, never done internally.
    pub fn start_recording(&mut self) -> Result<()> {
        match &mut self.source {
            Source::Capture(_) => Ok(()),
            Source::Offline { recording, .. } => {
                *recording = true;
                Ok(())
            }
            Source::Idle => {
                let session = open_capture(&self.cfg)?;
                debug!(
                    target: "vocalis::audio",
                    device_rate = session.device_rate,
                    "capture session opened"
                );
                self.source = Source::Capture(session);
                Ok(())
            }
        }
    }

    /// Close the capture session and clear live metrics. Idempotent.
    pub fn stop_recording(&mut self) {
        match &mut self.source {
            Source::Offline { recording, queue } => {
                *recording = false;
                queue.clear();
            }
            Source::Capture(_) => {
                self.source = Source::Idle;
            }
            Source::Idle => {}
        }
        self.live.reset();
    }

    pub fn is_recording(&self) -> bool {
        match &self.source {
            Source::Idle => false,
            Source::Capture(_) => true,
            Source::Offline { recording, .. } => *recording,
        }
    }

    /// Offline mode only: chop caller PCM (at the target rate) into frames.
    pub fn feed_pcm(&mut self, samples: &[f32]) {
        let frame_samples = self.cfg.frame_samples();
        match &mut self.source {
            Source::Offline {
                recording: true,
                queue,
            } => {
                for chunk in samples.chunks(frame_samples) {
                    let mut frame = chunk.to_vec();
                    frame.resize(frame_samples, 0.0);
                    queue.push_back(frame);
                }
            }
            Source::Offline { recording: false, .. } => {
                warn!(target: "vocalis::audio", "feed_pcm ignored: not recording");
            }
            _ => {
                warn!(target: "vocalis::audio", "feed_pcm ignored: hardware capture active");
            }
        }
    }

    /// Pull the next conditioned frame: metered, noise-tracked, denoised.
    /// Returns `None` (and flags an underrun) when no frame is pending.
    pub fn next_frame(&mut self) -> Option<Vec<f32>> {
        let (raw, queued) = match &mut self.source {
            Source::Idle => return None,
            Source::Offline { queue, recording } => {
                if !*recording {
                    return None;
                }
                match queue.pop_front() {
                    Some(frame) => (frame, queue.len()),
                    None => {
                        self.live.mark_underrun();
                        return None;
                    }
                }
            }
            // Capture frames arrive already downmixed and at the pipeline
            // rate; the chopper owns that conversion.
            Source::Capture(session) => match session.receiver.try_recv() {
                Ok(frame) => (frame, session.receiver.len()),
                Err(_) => {
                    self.live.mark_underrun();
                    return None;
                }
            },
        };

        Some(self.condition(raw, queued))
    }

    fn condition(&mut self, mut frame: Vec<f32>, queued: usize) -> Vec<f32> {
        let db = rms_db(&frame);
        let clipping = is_clipping(&frame);
        if db <= NOISE_TRACK_THRESHOLD_DB {
            self.noise_db = (1.0 - NOISE_EMA_RATE) * self.noise_db + NOISE_EMA_RATE * db;
        }
        let snr = (db - self.noise_db).max(0.0);
        self.live.publish_frame(volume_from_db(db), snr, clipping);
        // Latency is pipeline depth: this frame plus whatever is queued.
        self.live
            .set_latency_ms(self.cfg.frame_ms * (queued as u64 + 1));

        if self.cfg.noise_reduction {
            self.denoiser.process(&mut frame);
        }
        frame
    }

    /// Toggle spectral subtraction without reopening the capture session.
    pub fn set_noise_reduction(&mut self, enabled: bool) {
        self.cfg.noise_reduction = enabled;
    }

    pub fn set_noise_reduction_level(&mut self, level: f32) {
        let level = level.clamp(0.0, 1.0);
        self.cfg.noise_reduction_level = level;
        self.denoiser.set_level(level);
    }

    /// Current metrics snapshot; atomics only, safe to call per animation
    /// frame.
    pub fn metrics(&self) -> AudioMetrics {
        self.live.snapshot()
    }

    /// Shared handle for UI meters that outlive a borrow of the processor.
    pub fn metrics_handle(&self) -> LiveMetrics {
        self.live.clone()
    }

    /// Background noise estimate on the 0..1 volume scale.
    pub fn noise_level(&self) -> f32 {
        volume_from_db(self.noise_db)
    }

    pub fn frames_dropped(&self) -> usize {
        match &self.source {
            Source::Capture(session) => session.dropped.load(Ordering::Relaxed),
            _ => 0,
        }
    }
}

fn classify_device_error(message: &str) -> RecognitionError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("access") {
        RecognitionError::PermissionDenied(message.to_string())
    } else {
        RecognitionError::NoMicrophone(message.to_string())
    }
}

fn open_capture(cfg: &ProcessorConfig) -> Result<CaptureSession> {
    let host = cpal::default_host();
    let device = match &cfg.preferred_device {
        Some(name) => {
            let mut devices = host
                .input_devices()
                .map_err(|err| classify_device_error(&err.to_string()))?;
            devices
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| {
                    RecognitionError::NoMicrophone(format!("input device '{name}' not found"))
                })?
        }
        None => host.default_input_device().ok_or_else(|| {
            RecognitionError::NoMicrophone("no default input device".to_string())
        })?,
    };

    let default_config = device
        .default_input_config()
        .map_err(|err| classify_device_error(&err.to_string()))?;
    let format = default_config.sample_format();
    let device_config: StreamConfig = default_config.into();
    let device_rate = device_config.sample_rate.0;
    let channels = usize::from(device_config.channels.max(1));

    let (sender, receiver) = bounded::<Vec<f32>>(cfg.channel_capacity.max(1));
    let dropped = Arc::new(AtomicUsize::new(0));
    let chopper = Arc::new(std::sync::Mutex::new(FrameChopper::new(
        cfg.frame_samples(),
        device_rate,
        cfg.sample_rate,
        sender,
        Arc::clone(&dropped),
    )));

    let err_fn = |err| warn!(target: "vocalis::audio", "audio stream error: {err}");
    let stream = match format {
        SampleFormat::F32 => {
            let chopper = Arc::clone(&chopper);
            let dropped = Arc::clone(&dropped);
            device
                .build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut pump) = chopper.try_lock() {
                            pump.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|err| classify_device_error(&err.to_string()))?
        }
        SampleFormat::I16 => {
            let chopper = Arc::clone(&chopper);
            let dropped = Arc::clone(&dropped);
            device
                .build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut pump) = chopper.try_lock() {
                            pump.push(data, channels, |sample| sample as f32 / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|err| classify_device_error(&err.to_string()))?
        }
        SampleFormat::U16 => {
            let chopper = Arc::clone(&chopper);
            let dropped = Arc::clone(&dropped);
            device
                .build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut pump) = chopper.try_lock() {
                            pump.push(data, channels, |sample| {
                                (sample as f32 - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|err| classify_device_error(&err.to_string()))?
        }
        other => {
            return Err(RecognitionError::AudioProcessingError(format!(
                "unsupported sample format: {other:?}"
            )))
        }
    };

    stream
        .play()
        .map_err(|err| RecognitionError::AudioProcessingError(err.to_string()))?;

    Ok(CaptureSession {
        _stream: stream,
        receiver,
        dropped,
        device_rate,
    })
}
