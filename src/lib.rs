//! Client-side speech recognition orchestration.
//!
//! `vocalis` coordinates two interchangeable recognition backends (a
//! platform-native service and an offline neural model) behind one engine:
//! it selects a backend per session, conditions captured audio (metering
//! and spectral noise reduction), routes frames through extension plugins,
//! delivers results through a subscription-based event surface, and switches
//! backends automatically when a recoverable failure occurs.
//!
//! The engine is single-threaded and event-driven: the host calls
//! [`RecognitionEngine::pump`] from its own loop, and all delivery happens
//! inside that call. Concrete recognition services plug in behind the
//! [`backend::SpeechBackend`] trait and the adapters' injection seams.

pub mod audio;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod language;
pub mod plugin;
pub mod telemetry;

pub use audio::{AudioMetrics, AudioProcessor, ProcessorConfig};
pub use backend::{BackendId, SpeechBackend, SpeechResult};
pub use config::{PerformancePreference, RecognitionConfig};
pub use engine::{EngineStatus, PerformanceStatistics, RecognitionEngine, SessionState};
pub use error::{RecognitionError, Result};
pub use events::{EngineEvent, EventKind, Subscription};
pub use plugin::{PluginCapabilities, RecognitionPlugin};
