//! Recognition backend capability contract.
//!
//! The engine coordinates two interchangeable backends behind one trait: the
//! low-latency platform-native service and the higher-accuracy offline
//! neural model. The engine never sees past the contract; concrete engines
//! plug in behind the adapters' injection seams.

mod bridge;
mod native;
mod neural;

pub use bridge::{event_channel, EventDrain, EventFeed};
pub use native::{NativeBackend, PlatformSession};
pub use neural::{ModelSize, NeuralBackend, NeuralDecoder};

use crate::error::{RecognitionError, Result};
use serde::{Deserialize, Serialize};

/// Identifies a backend in the selection policy, statistics, and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    Native,
    Neural,
}

impl BackendId {
    pub fn label(self) -> &'static str {
        match self {
            BackendId::Native => "native",
            BackendId::Neural => "neural",
        }
    }

    /// The other member of the pair, used by the failure-recovery policy.
    pub fn other(self) -> BackendId {
        match self {
            BackendId::Native => BackendId::Neural,
            BackendId::Neural => BackendId::Native,
        }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A lower-confidence transcription hypothesis attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: f32,
}

/// Per-result observability data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub audio_level: f32,
    pub signal_quality: f32,
    pub processing_time_ms: u64,
    pub backend: BackendId,
    pub noise_level: f32,
}

impl Default for ResultMetadata {
    fn default() -> Self {
        Self {
            audio_level: 0.0,
            signal_quality: 0.0,
            processing_time_ms: 0,
            backend: BackendId::Native,
            noise_level: 0.0,
        }
    }
}

/// One recognition result. Immutable once produced; the engine emits it and
/// keeps only aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResult {
    pub transcript: String,
    pub confidence: f32,
    pub is_final: bool,
    pub language: String,
    pub alternatives: Vec<Alternative>,
    pub timestamp_ms: u64,
    pub metadata: ResultMetadata,
}

impl SpeechResult {
    /// Minimal final result, used by backends that report no alternatives.
    pub fn simple(transcript: impl Into<String>, confidence: f32, language: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: confidence.clamp(0.0, 1.0),
            is_final: true,
            language: language.into(),
            alternatives: Vec::new(),
            timestamp_ms: 0,
            metadata: ResultMetadata::default(),
        }
    }
}

/// What a backend hands the engine when polled.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Result(SpeechResult),
    Error(RecognitionError),
}

/// Capability contract every concrete backend satisfies.
///
/// Lifecycle: `initialize(language)` once per language, `start`/`stop` around
/// each listening window. Results and errors are pulled with
/// `try_next_event` from the engine's pump; nothing here blocks.
pub trait SpeechBackend {
    fn id(&self) -> BackendId;

    /// Whether this backend can serve the current platform at all.
    fn is_supported(&self) -> bool;

    fn initialize(&mut self, language: &str) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn supports_language(&self, code: &str) -> bool;

    /// Offer a processed audio frame for recognition. Backends that source
    /// audio through their own platform capture may ignore this.
    fn push_audio(&mut self, _samples: &[f32]) {}

    /// Non-blocking drain of pending results and errors, in production order.
    fn try_next_event(&mut self) -> Option<BackendEvent>;
}
