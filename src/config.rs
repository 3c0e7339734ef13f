//! Engine configuration accepted at `initialize` / `start_listening`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// How the selection policy should weigh speed against accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformancePreference {
    /// Favor the low-latency platform-native backend when available.
    Speed,
    /// Favor the offline-neural backend.
    Accuracy,
    /// Favor whichever backend is not the platform-native one.
    ResourceSaving,
    /// Native if available, otherwise neural; coin-flipped when both fit.
    Balanced,
}

impl PerformancePreference {
    pub fn label(self) -> &'static str {
        match self {
            PerformancePreference::Speed => "speed",
            PerformancePreference::Accuracy => "accuracy",
            PerformancePreference::ResourceSaving => "resource-saving",
            PerformancePreference::Balanced => "balanced",
        }
    }
}

/// Session configuration. Serialized across the host-app boundary, so every
/// field has a serde-friendly shape and a conservative default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecognitionConfig {
    /// BCP-47 language tag, e.g. "en-US".
    pub language: String,
    /// Keep recognizing after the first final result.
    pub continuous: bool,
    /// Deliver non-final hypotheses as they form.
    pub interim_results: bool,
    /// Upper bound on alternatives attached to each result.
    pub max_alternatives: u32,
    /// Results below this confidence are dropped before delivery.
    pub confidence_threshold: f32,
    /// Run spectral subtraction on captured frames.
    pub noise_reduction: bool,
    /// Over-subtraction factor for the denoiser, 0.0..=1.0.
    pub noise_reduction_level: f32,
    /// EMA rate for the adaptive noise-floor estimate, 0.0..=1.0.
    pub adaptation_rate: f32,
    /// Let the detector move `current_language` from recognized text.
    pub auto_language_detection: bool,
    /// Prefer the offline backend regardless of connectivity.
    pub offline_first: bool,
    /// Never send audio off-device; forces the offline backend.
    pub privacy_mode: bool,
    /// Allow automatic engine switching on recoverable errors.
    pub auto_engine_selection: bool,
    pub performance_preference: PerformancePreference,
    /// Recovery: how long the backend may stay silent while listening
    /// before the watchdog fires, in milliseconds.
    pub result_timeout_ms: u64,
    /// Recovery: retry budget for automatic engine switching.
    pub max_recovery_retries: u32,
    /// Recovery: first backoff delay; doubles per attempt.
    pub recovery_backoff_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: 3,
            confidence_threshold: 0.0,
            noise_reduction: true,
            noise_reduction_level: 0.7,
            adaptation_rate: 0.05,
            auto_language_detection: false,
            offline_first: false,
            privacy_mode: false,
            auto_engine_selection: true,
            performance_preference: PerformancePreference::Balanced,
            result_timeout_ms: 10_000,
            max_recovery_retries: 3,
            recovery_backoff_ms: 250,
        }
    }
}

impl RecognitionConfig {
    /// Check value ranges and reject nonsense before a session starts.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            bail!("language must not be empty");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence_threshold must be within 0.0..=1.0, got {}",
                self.confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.noise_reduction_level) {
            bail!(
                "noise_reduction_level must be within 0.0..=1.0, got {}",
                self.noise_reduction_level
            );
        }
        if !(0.0..=1.0).contains(&self.adaptation_rate) {
            bail!(
                "adaptation_rate must be within 0.0..=1.0, got {}",
                self.adaptation_rate
            );
        }
        if self.max_alternatives == 0 || self.max_alternatives > 10 {
            bail!(
                "max_alternatives must be between 1 and 10, got {}",
                self.max_alternatives
            );
        }
        if self.result_timeout_ms < 1_000 {
            bail!(
                "result_timeout_ms must be at least 1000, got {}",
                self.result_timeout_ms
            );
        }
        if self.recovery_backoff_ms == 0 {
            bail!("recovery_backoff_ms must be nonzero");
        }
        Ok(())
    }

    /// Clamp tunables into their documented ranges. The engine applies this
    /// on `start_listening` so a sloppy host config degrades instead of
    /// failing mid-session.
    pub fn normalized(mut self) -> Self {
        self.confidence_threshold = self.confidence_threshold.clamp(0.0, 1.0);
        self.noise_reduction_level = self.noise_reduction_level.clamp(0.0, 1.0);
        self.adaptation_rate = self.adaptation_rate.clamp(0.0, 1.0);
        self.max_alternatives = self.max_alternatives.clamp(1, 10);
        self
    }
}
