//! Extension plugins.
//!
//! Plugins may transform audio before recognition, enrich results after
//! recognition, or override language detection. Capabilities are declared
//! explicitly and checked once at registration, not discovered per call.
//! Hooks run in strict registration order, each stage receiving the previous
//! stage's output; a failing or panicking hook is logged and skipped so one
//! misbehaving plugin can never abort recognition.

use crate::backend::SpeechResult;
use crate::error::{RecognitionError, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Which optional hooks a plugin implements. Declared up front so the host
/// can skip stages without probing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    pub process_audio: bool,
    pub enhance_result: bool,
    pub detect_language: bool,
}

impl PluginCapabilities {
    pub fn is_empty(&self) -> bool {
        !(self.process_audio || self.enhance_result || self.detect_language)
    }
}

/// Lifecycle position of a registered plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Registered,
    Initialized,
    Disposed,
}

/// Contract implemented by extensions.
///
/// Only the hooks named in [`RecognitionPlugin::capabilities`] are invoked;
/// the defaults are pass-through.
pub trait RecognitionPlugin {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn capabilities(&self) -> PluginCapabilities;

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) {}

    /// Transform an audio frame before it reaches the backend.
    fn process_audio(&mut self, frame: Vec<f32>) -> Result<Vec<f32>> {
        Ok(frame)
    }

    /// Return a modified copy of a recognition result.
    fn enhance_result(&mut self, result: SpeechResult) -> Result<SpeechResult> {
        Ok(result)
    }

    /// Frame-scoped language override; `None` defers to the built-in
    /// detector.
    fn detect_language(&mut self, _frame: &[f32]) -> Option<String> {
        None
    }
}

struct Registered {
    plugin: Box<dyn RecognitionPlugin>,
    capabilities: PluginCapabilities,
    state: PluginState,
}

/// Owns the active plugin set for one engine session.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Registered>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register and initialize a plugin. Names are unique keys; a duplicate
    /// or hook-less plugin is rejected here rather than misbehaving later.
    pub fn register(&mut self, mut plugin: Box<dyn RecognitionPlugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if name.trim().is_empty() {
            return Err(RecognitionError::AudioProcessingError(
                "plugin name must not be empty".into(),
            ));
        }
        if self.plugins.iter().any(|p| p.plugin.name() == name) {
            return Err(RecognitionError::AudioProcessingError(format!(
                "plugin '{name}' is already registered"
            )));
        }
        let capabilities = plugin.capabilities();
        if capabilities.is_empty() {
            return Err(RecognitionError::AudioProcessingError(format!(
                "plugin '{name}' declares no hooks"
            )));
        }
        plugin.initialize()?;
        self.plugins.push(Registered {
            plugin,
            capabilities,
            state: PluginState::Initialized,
        });
        Ok(())
    }

    /// Run `cleanup` and drop the plugin. Unknown names are an error so the
    /// host application notices stale handles.
    pub fn unregister(&mut self, name: &str) -> Result<()> {
        let index = self
            .plugins
            .iter()
            .position(|p| p.plugin.name() == name)
            .ok_or_else(|| {
                RecognitionError::AudioProcessingError(format!("plugin '{name}' is not registered"))
            })?;
        let mut entry = self.plugins.remove(index);
        entry.state = PluginState::Disposed;
        entry.plugin.cleanup();
        Ok(())
    }

    pub fn state_of(&self, name: &str) -> Option<PluginState> {
        self.plugins
            .iter()
            .find(|p| p.plugin.name() == name)
            .map(|p| p.state)
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|p| p.plugin.name().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Cleanup every plugin, used on engine disposal.
    pub fn dispose_all(&mut self) {
        for entry in &mut self.plugins {
            entry.state = PluginState::Disposed;
            entry.plugin.cleanup();
        }
        self.plugins.clear();
    }

    /// Stage 1: audio pipeline. Each hook receives the previous hook's
    /// output; a failed hook's input flows on unchanged.
    pub fn run_audio_pipeline(&mut self, frame: Vec<f32>) -> Vec<f32> {
        let mut current = frame;
        for entry in &mut self.plugins {
            if !entry.capabilities.process_audio {
                continue;
            }
            let input = current.clone();
            let name = entry.plugin.name().to_string();
            match catch_unwind(AssertUnwindSafe(|| entry.plugin.process_audio(input))) {
                Ok(Ok(output)) => current = output,
                Ok(Err(err)) => {
                    warn!(target: "vocalis::plugin", plugin = %name, error = %err, "process_audio hook failed");
                }
                Err(_) => {
                    warn!(target: "vocalis::plugin", plugin = %name, "process_audio hook panicked");
                }
            }
        }
        current
    }

    /// Stage 3: result enrichment, same ordering and isolation rules.
    pub fn run_result_pipeline(&mut self, result: SpeechResult) -> SpeechResult {
        let mut current = result;
        for entry in &mut self.plugins {
            if !entry.capabilities.enhance_result {
                continue;
            }
            let input = current.clone();
            let name = entry.plugin.name().to_string();
            match catch_unwind(AssertUnwindSafe(|| entry.plugin.enhance_result(input))) {
                Ok(Ok(output)) => current = output,
                Ok(Err(err)) => {
                    warn!(target: "vocalis::plugin", plugin = %name, error = %err, "enhance_result hook failed");
                }
                Err(_) => {
                    warn!(target: "vocalis::plugin", plugin = %name, "enhance_result hook panicked");
                }
            }
        }
        current
    }

    /// Stage 4: first non-null plugin verdict overrides the built-in
    /// detector for this frame only.
    pub fn detect_language(&mut self, frame: &[f32]) -> Option<String> {
        for entry in &mut self.plugins {
            if !entry.capabilities.detect_language {
                continue;
            }
            let name = entry.plugin.name().to_string();
            match catch_unwind(AssertUnwindSafe(|| entry.plugin.detect_language(frame))) {
                Ok(Some(language)) => return Some(language),
                Ok(None) => {}
                Err(_) => {
                    warn!(target: "vocalis::plugin", plugin = %name, "detect_language hook panicked");
                }
            }
        }
        None
    }
}
