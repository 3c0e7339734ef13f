//! Error taxonomy for the recognition engine.
//!
//! Every public operation returns `Result<_, RecognitionError>`. Each variant
//! carries a fixed recoverability classification that drives the automatic
//! engine-switching policy: recoverable errors enter the retry/backoff path,
//! non-recoverable ones surface to subscribers immediately.

use thiserror::Error;

/// Errors produced by the engine, the audio processor, and backends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    #[error("no microphone available: {0}")]
    NoMicrophone(String),

    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("speech recognition is not supported on this platform")]
    NotSupported,

    #[error("failed to load recognition model: {0}")]
    ModelLoadFailed(String),

    #[error("audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("language '{0}' is not supported by the active backend")]
    LanguageNotSupported(String),

    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("backend produced no results for {0}ms")]
    Timeout(u64),

    #[error("recognition interrupted: {0}")]
    Interrupted(String),

    #[error("engine not initialized; call initialize() first")]
    EngineNotInitialized,

    #[error("engine is already initialized; dispose() it before reinitializing")]
    AlreadyInitialized,

    #[error("engine switch to '{target}' failed: {reason}")]
    EngineSwitchFailed { target: String, reason: String },

    #[error("engine has been disposed; no further operations are permitted")]
    Disposed,
}

impl RecognitionError {
    /// Whether the failure-recovery policy may retry on another backend.
    ///
    /// Hardware and capability problems are final: retrying on a different
    /// backend cannot conjure a microphone or a permission grant.
    pub fn recoverable(&self) -> bool {
        match self {
            RecognitionError::NetworkError(_)
            | RecognitionError::ModelLoadFailed(_)
            | RecognitionError::AudioProcessingError(_)
            | RecognitionError::InsufficientResources(_)
            | RecognitionError::Timeout(_)
            | RecognitionError::Interrupted(_) => true,
            RecognitionError::NoMicrophone(_)
            | RecognitionError::PermissionDenied(_)
            | RecognitionError::NotSupported
            | RecognitionError::LanguageNotSupported(_)
            | RecognitionError::EngineNotInitialized
            | RecognitionError::AlreadyInitialized
            | RecognitionError::EngineSwitchFailed { .. }
            | RecognitionError::Disposed => false,
        }
    }

    /// Stable machine-readable label for logs and statistics.
    pub fn label(&self) -> &'static str {
        match self {
            RecognitionError::NoMicrophone(_) => "no_microphone",
            RecognitionError::PermissionDenied(_) => "permission_denied",
            RecognitionError::NetworkError(_) => "network_error",
            RecognitionError::NotSupported => "not_supported",
            RecognitionError::ModelLoadFailed(_) => "model_load_failed",
            RecognitionError::AudioProcessingError(_) => "audio_processing_error",
            RecognitionError::LanguageNotSupported(_) => "language_not_supported",
            RecognitionError::InsufficientResources(_) => "insufficient_resources",
            RecognitionError::Timeout(_) => "timeout",
            RecognitionError::Interrupted(_) => "interrupted",
            RecognitionError::EngineNotInitialized => "engine_not_initialized",
            RecognitionError::AlreadyInitialized => "already_initialized",
            RecognitionError::EngineSwitchFailed { .. } => "engine_switch_failed",
            RecognitionError::Disposed => "disposed",
        }
    }

    /// User-facing hint appended when the retry budget is exhausted.
    pub fn user_hint(&self) -> &'static str {
        match self {
            RecognitionError::NoMicrophone(_) => {
                "Check that a microphone is connected and not in use by another application."
            }
            RecognitionError::PermissionDenied(_) => {
                "Grant microphone access in your system privacy settings."
            }
            _ => "Check your microphone hardware and permissions, then try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, RecognitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_errors_are_not_recoverable() {
        assert!(!RecognitionError::NoMicrophone("gone".into()).recoverable());
        assert!(!RecognitionError::PermissionDenied("denied".into()).recoverable());
        assert!(!RecognitionError::NotSupported.recoverable());
        assert!(!RecognitionError::Disposed.recoverable());
    }

    #[test]
    fn lifecycle_misuse_is_not_retryable() {
        assert!(!RecognitionError::EngineNotInitialized.recoverable());
        assert!(!RecognitionError::AlreadyInitialized.recoverable());
    }

    #[test]
    fn transient_errors_are_recoverable() {
        assert!(RecognitionError::NetworkError("offline".into()).recoverable());
        assert!(RecognitionError::Timeout(5000).recoverable());
        assert!(RecognitionError::ModelLoadFailed("bad file".into()).recoverable());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(RecognitionError::NotSupported.label(), "not_supported");
        assert_eq!(
            RecognitionError::EngineSwitchFailed {
                target: "neural".into(),
                reason: "x".into()
            }
            .label(),
            "engine_switch_failed"
        );
    }
}
