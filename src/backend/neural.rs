//! Offline-neural backend adapter.
//!
//! Higher accuracy, no connectivity requirement, configurable model size.
//! The inference engine itself sits behind the [`NeuralDecoder`] seam; this
//! adapter owns model-load lifecycle and serves every registry language.

use super::{BackendEvent, BackendId, EventDrain, SpeechBackend};
use crate::error::{RecognitionError, Result};
use crate::language;
use tracing::{debug, info};

/// Neural model size. Larger models trade latency and memory for accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn label(self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    /// Rough resident memory budget, used for capacity warnings.
    pub fn approx_memory_mb(self) -> u32 {
        match self {
            ModelSize::Tiny => 75,
            ModelSize::Base => 140,
            ModelSize::Small => 460,
            ModelSize::Medium => 1500,
            ModelSize::Large => 2900,
        }
    }
}

/// Seam to the local inference engine (whisper.cpp, candle, ONNX, ...).
pub trait NeuralDecoder {
    /// Load model weights for `size`. Called once per adapter lifetime.
    fn load(&mut self, size: ModelSize) -> Result<()>;

    fn begin(&mut self, language: &str) -> Result<()>;

    fn end(&mut self) -> Result<()>;

    fn push_audio(&mut self, _samples: &[f32]) {}

    fn try_next_event(&mut self) -> Option<BackendEvent>;
}

/// Default [`NeuralDecoder`]: a channel bridge fed by the host-side
/// inference worker.
pub struct BridgedDecoder {
    drain: EventDrain,
    active: bool,
}

impl BridgedDecoder {
    pub fn new(drain: EventDrain) -> Self {
        Self {
            drain,
            active: false,
        }
    }
}

impl NeuralDecoder for BridgedDecoder {
    fn load(&mut self, size: ModelSize) -> Result<()> {
        info!(target: "vocalis::backend", model = size.label(), "neural model loaded");
        Ok(())
    }

    fn begin(&mut self, _language: &str) -> Result<()> {
        self.active = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.active = false;
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

/// The offline-neural member of the backend pair.
pub struct NeuralBackend {
    decoder: Box<dyn NeuralDecoder>,
    size: ModelSize,
    language: Option<String>,
    loaded: bool,
    running: bool,
}

impl NeuralBackend {
    pub fn new(decoder: Box<dyn NeuralDecoder>, size: ModelSize) -> Self {
        Self {
            decoder,
            size,
            language: None,
            loaded: false,
            running: false,
        }
    }

    /// Convenience constructor over the channel bridge.
    pub fn bridged(drain: EventDrain, size: ModelSize) -> Self {
        Self::new(Box::new(BridgedDecoder::new(drain)), size)
    }

    pub fn model_size(&self) -> ModelSize {
        self.size
    }
}

impl SpeechBackend for NeuralBackend {
    fn id(&self) -> BackendId {
        BackendId::Neural
    }

    fn is_supported(&self) -> bool {
        // Pure-local inference: no platform or connectivity requirement.
        true
    }

    fn initialize(&mut self, language: &str) -> Result<()> {
        if !self.supports_language(language) {
            return Err(RecognitionError::LanguageNotSupported(language.to_string()));
        }
        if !self.loaded {
            self.decoder
                .load(self.size)
                .map_err(|err| match err {
                    RecognitionError::ModelLoadFailed(_) => err,
                    other => RecognitionError::ModelLoadFailed(other.to_string()),
                })?;
            self.loaded = true;
        }
        self.language = Some(language.to_string());
        debug!(target: "vocalis::backend", backend = "neural", language, "initialized");
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
        self.decoder.begin(&language)?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.decoder.end()
    }

    fn supports_language(&self, code: &str) -> bool {
        language::supports(BackendId::Neural, code)
    }

    fn push_audio(&mut self, samples: &[f32]) {
        if self.running {
            self.decoder.push_audio(samples);
        }
    }

    fn try_next_event(&mut self) -> Option<BackendEvent> {
        if !self.running {
            return None;
        }
        self.decoder.try_next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::event_channel;

    struct FailingDecoder;

    impl NeuralDecoder for FailingDecoder {
        fn load(&mut self, _size: ModelSize) -> Result<()> {
            Err(RecognitionError::ModelLoadFailed("corrupt weights".into()))
        }
        fn begin(&mut self, _language: &str) -> Result<()> {
            Ok(())
        }
        fn end(&mut self) -> Result<()> {
            Ok(())
        }
        fn try_next_event(&mut self) -> Option<BackendEvent> {
            None
        }
    }

    #[test]
    fn serves_the_whole_registry() {
        let (_feed, drain) = event_channel();
        let backend = NeuralBackend::bridged(drain, ModelSize::Base);
        assert!(backend.supports_language("en-US"));
        assert!(backend.supports_language("yo"));
        assert!(!backend.supports_language("not-a-language"));
    }

    #[test]
    fn load_failure_surfaces_as_model_load_failed() {
        let mut backend = NeuralBackend::new(Box::new(FailingDecoder), ModelSize::Large);
        match backend.initialize("en-US") {
            Err(RecognitionError::ModelLoadFailed(msg)) => {
                assert!(msg.contains("corrupt"));
            }
            other => panic!("expected ModelLoadFailed, got {other:?}"),
        }
    }

    #[test]
    fn model_loads_once_across_reinitialization() {
        struct CountingDecoder {
            loads: std::rc::Rc<std::cell::Cell<u32>>,
        }
        impl NeuralDecoder for CountingDecoder {
            fn load(&mut self, _size: ModelSize) -> Result<()> {
                self.loads.set(self.loads.get() + 1);
                Ok(())
            }
            fn begin(&mut self, _language: &str) -> Result<()> {
                Ok(())
            }
            fn end(&mut self) -> Result<()> {
                Ok(())
            }
            fn try_next_event(&mut self) -> Option<BackendEvent> {
                None
            }
        }

        let loads = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut backend = NeuralBackend::new(
            Box::new(CountingDecoder {
                loads: std::rc::Rc::clone(&loads),
            }),
            ModelSize::Small,
        );
        backend.initialize("en-US").expect("first init");
        backend.initialize("fr-FR").expect("language change");
        assert_eq!(loads.get(), 1, "weights should load once");
    }

    #[test]
    fn memory_budget_grows_with_size() {
        assert!(ModelSize::Large.approx_memory_mb() > ModelSize::Tiny.approx_memory_mb());
    }
}
