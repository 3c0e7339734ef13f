//! Platform-native backend adapter.
//!
//! Low latency, but only available where the OS or browser exposes a speech
//! service and connectivity allows it. The service itself lives behind the
//! [`PlatformSession`] seam; this adapter owns lifecycle and language
//! gating against the registry.

use super::{BackendEvent, BackendId, EventDrain, SpeechBackend};
use crate::error::{RecognitionError, Result};
use crate::language;
use tracing::debug;

/// Seam to the OS / browser speech service.
///
/// `begin`/`end` bracket one listening window. Results arrive through
/// `try_next_event` in production order.
pub trait PlatformSession {
    /// Whether the platform service exists and is reachable right now.
    fn is_available(&self) -> bool;

    fn begin(&mut self, language: &str) -> Result<()>;

    fn end(&mut self) -> Result<()>;

    /// Most platform services capture audio themselves; the processed-frame
    /// path is optional.
    fn push_audio(&mut self, _samples: &[f32]) {}

    fn try_next_event(&mut self) -> Option<BackendEvent>;
}

/// Default [`PlatformSession`]: a channel bridge fed by the host-side
/// platform integration.
pub struct BridgedSession {
    drain: EventDrain,
    available: bool,
    active: bool,
}

impl BridgedSession {
    pub fn new(drain: EventDrain, available: bool) -> Self {
        Self {
            drain,
            available,
            active: false,
        }
    }
}

impl PlatformSession for BridgedSession {
    fn is_available(&self) -> bool {
        self.available
    }

    fn begin(&mut self, _language: &str) -> Result<()> {
        if !self.available {
            return Err(RecognitionError::NetworkError(
                "platform speech service unreachable".into(),
            ));
        }
        self.active = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.active = false;
        // Anything still queued belongs to the closed window.
        self.drain.clear();
        Ok(())
    }

    fn try_next_event(&mut self) -> Option<BackendEvent> {
        if !self.active {
            return None;
        }
        self.drain.try_next()
    }
}

/// The platform-native member of the backend pair.
pub struct NativeBackend {
    session: Box<dyn PlatformSession>,
    language: Option<String>,
    running: bool,
}

impl NativeBackend {
    pub fn new(session: Box<dyn PlatformSession>) -> Self {
        Self {
            session,
            language: None,
            running: false,
        }
    }

    /// Convenience constructor over the channel bridge.
    pub fn bridged(drain: EventDrain, available: bool) -> Self {
        Self::new(Box::new(BridgedSession::new(drain, available)))
    }
}

impl SpeechBackend for NativeBackend {
    fn id(&self) -> BackendId {
        BackendId::Native
    }

    fn is_supported(&self) -> bool {
        self.session.is_available()
    }

    fn initialize(&mut self, language: &str) -> Result<()> {
        if !self.session.is_available() {
            return Err(RecognitionError::NotSupported);
        }
        if !self.supports_language(language) {
            return Err(RecognitionError::LanguageNotSupported(language.to_string()));
        }
        self.language = Some(language.to_string());
        debug!(target: "vocalis::backend", backend = "native", language, "initialized");
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let language = self
            .language
            .clone()
            .ok_or(RecognitionError::EngineNotInitialized)?;
        if self.running {
            return Ok(());
        }
        self.session.begin(&language)?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.session.end()
    }

    fn supports_language(&self, code: &str) -> bool {
        language::supports(BackendId::Native, code)
    }

    fn push_audio(&mut self, samples: &[f32]) {
        if self.running {
            self.session.push_audio(samples);
        }
    }

    fn try_next_event(&mut self) -> Option<BackendEvent> {
        if !self.running {
            return None;
        }
        self.session.try_next_event()
    }
}
