//! Recognition session orchestrator.
//!
//! One [`RecognitionEngine`] owns the audio pipeline, the two backends, the
//! plugin host, and the event surface, and drives them from a single
//! cooperative scheduling point: the host calls [`RecognitionEngine::pump`]
//! regularly (per UI tick or event-loop turn) and every frame, result, and
//! recovery decision happens inside that call on the caller's thread.

mod policy;
mod recovery;
mod stats;

pub use policy::{select_backend, SeededCoin, SelectionContext, TieBreak};
pub use recovery::{RecoveryPolicy, RecoveryState, Watchdog};
pub use stats::{PerformanceStatistics, StatsAccumulator};

use crate::audio::{AudioMetrics, AudioProcessor};
use crate::backend::{BackendEvent, BackendId, SpeechBackend, SpeechResult};
use crate::config::RecognitionConfig;
use crate::error::{RecognitionError, Result};
use crate::events::{EngineEvent, EventBus, EventKind, Subscription};
use crate::language::{self, LanguageDetector};
use crate::plugin::{PluginHost, RecognitionPlugin};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Session lifecycle. Guards on every operation keep the transitions to the
/// documented edges; `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Listening,
    Paused,
    Stopped,
    Disposed,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Listening => "listening",
            SessionState::Paused => "paused",
            SessionState::Stopped => "stopped",
            SessionState::Disposed => "disposed",
        }
    }
}

/// Point-in-time view of the engine for status panes and diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub state: &'static str,
    pub is_listening: bool,
    pub session_id: Option<String>,
    pub backend: Option<BackendId>,
    pub language: String,
    pub audio: AudioMetrics,
    pub recovery_attempts: u32,
    pub plugins: Vec<String>,
}

fn new_session_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("session-{ms:x}-{n}")
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// The orchestrator. Single-threaded by design; see the module docs.
pub struct RecognitionEngine {
    state: SessionState,
    config: RecognitionConfig,
    audio: AudioProcessor,
    native: Box<dyn SpeechBackend>,
    neural: Box<dyn SpeechBackend>,
    active_backend: Option<BackendId>,
    session_id: Option<String>,
    language: String,
    bus: EventBus,
    plugins: PluginHost,
    detector: LanguageDetector,
    stats: StatsAccumulator,
    coin: Box<dyn TieBreak>,
    explicit_backend: Option<BackendId>,
    recovery_policy: RecoveryPolicy,
    recovery: RecoveryState,
    watchdog: Watchdog,
    pending_language_hint: Option<String>,
}

impl RecognitionEngine {
    /// Backends are injected so hosts wire in whatever platform session and
    /// model decoder they ship with.
    pub fn new(
        audio: AudioProcessor,
        native: Box<dyn SpeechBackend>,
        neural: Box<dyn SpeechBackend>,
    ) -> Self {
        let config = RecognitionConfig::default();
        let recovery_policy =
            RecoveryPolicy::new(config.max_recovery_retries, config.recovery_backoff_ms);
        let watchdog = Watchdog::new(config.result_timeout_ms);
        Self {
            state: SessionState::Uninitialized,
            language: config.language.clone(),
            config,
            audio,
            native,
            neural,
            active_backend: None,
            session_id: None,
            bus: EventBus::new(),
            plugins: PluginHost::new(),
            detector: LanguageDetector::new(),
            stats: StatsAccumulator::new(),
            coin: Box::new(SeededCoin::default()),
            explicit_backend: None,
            recovery_policy,
            recovery: RecoveryState::new(),
            watchdog,
            pending_language_hint: None,
        }
    }

    pub fn with_config(mut self, config: RecognitionConfig) -> Self {
        self.apply_config(config.normalized());
        self
    }

    /// Replace the `Balanced` tie-break source, e.g. with a fixed coin in
    /// tests.
    pub fn with_tie_break(mut self, coin: Box<dyn TieBreak>) -> Self {
        self.coin = coin;
        self
    }

    /// Pin backend selection to one backend; `None` restores policy choice.
    pub fn set_preferred_backend(&mut self, backend: Option<BackendId>) {
        self.explicit_backend = backend;
    }

    // Lifecycle -----------------------------------------------------------

    /// Select a backend for `language` and prepare it. Valid only before any
    /// other lifecycle call.
    pub fn initialize(&mut self, language: &str) -> Result<()> {
        self.guard_disposed()?;
        if self.state != SessionState::Uninitialized {
            return Err(RecognitionError::AlreadyInitialized);
        }
        let descriptor = language::find(language)
            .ok_or_else(|| RecognitionError::LanguageNotSupported(language.to_string()))?;
        let code = descriptor.code.to_string();

        let ctx = SelectionContext {
            explicit: self.explicit_backend,
            offline_first: self.config.offline_first,
            privacy_mode: self.config.privacy_mode,
            preference: self.config.performance_preference,
            language: &code,
            native_available: self.native.is_supported(),
            neural_available: self.neural.is_supported(),
        };
        let mut choice = select_backend(&ctx, self.coin.as_mut())?;

        if let Err(err) = self.backend_mut(choice).initialize(&code) {
            // One selection-time fallback to the alternate backend; runtime
            // failures go through the recovery path instead.
            let alternate = choice.other();
            let usable = err.recoverable()
                && self.config.auto_engine_selection
                && self.explicit_backend.is_none()
                && self.backend(alternate).is_supported()
                && self.backend(alternate).supports_language(&code);
            if !usable {
                return Err(err);
            }
            warn!(
                target: "vocalis::engine",
                backend = %choice,
                error = %err,
                "selected backend failed to initialize, falling back"
            );
            self.backend_mut(alternate).initialize(&code)?;
            choice = alternate;
        }

        self.language = code;
        self.config.language = self.language.clone();
        self.active_backend = Some(choice);
        self.session_id = Some(new_session_id());
        self.state = SessionState::Initialized;
        info!(
            target: "vocalis::engine",
            session = self.session_id.as_deref().unwrap_or(""),
            backend = %choice,
            language = %self.language,
            "engine initialized"
        );
        Ok(())
    }

    /// Open the microphone and start the active backend. Valid from
    /// `Initialized` or `Stopped`; listening again is a no-op, and starting
    /// while paused resumes.
    pub fn start_listening(&mut self, config: Option<RecognitionConfig>) -> Result<()> {
        self.guard_disposed()?;
        match self.state {
            SessionState::Uninitialized => return Err(RecognitionError::EngineNotInitialized),
            SessionState::Listening => return Ok(()),
            SessionState::Paused => return self.resume_listening(),
            SessionState::Initialized | SessionState::Stopped => {}
            SessionState::Disposed => unreachable!("guarded above"),
        }

        if let Some(config) = config {
            config
                .validate()
                .map_err(|err| RecognitionError::AudioProcessingError(err.to_string()))?;
            let config = config.normalized();
            let wanted = config.language.clone();
            self.apply_config(config);
            if !wanted.eq_ignore_ascii_case(&self.language) {
                self.set_language(&wanted)?;
            }
        }

        let backend = self.active()?;
        self.audio.start_recording()?;
        if let Err(err) = self.backend_mut(backend).start() {
            self.audio.stop_recording();
            return Err(err);
        }
        self.state = SessionState::Listening;
        self.recovery.reset();
        self.watchdog.arm(Instant::now());
        debug!(target: "vocalis::engine", backend = %backend, "listening");
        Ok(())
    }

    /// Stop the backend, release the microphone, and discard anything still
    /// in flight. Idempotent once stopped.
    pub fn stop_listening(&mut self) -> Result<()> {
        self.guard_disposed()?;
        if !matches!(self.state, SessionState::Listening | SessionState::Paused) {
            return Ok(());
        }
        let backend = self.active()?;
        self.backend_mut(backend).stop()?;
        self.audio.stop_recording();
        self.watchdog.disarm();
        self.recovery.reset();
        self.pending_language_hint = None;
        self.state = SessionState::Stopped;
        debug!(target: "vocalis::engine", "stopped listening");
        Ok(())
    }

    /// Suppress delivery without closing the capture session. Results
    /// produced while paused are discarded, not queued.
    pub fn pause_listening(&mut self) -> Result<()> {
        self.guard_disposed()?;
        match self.state {
            SessionState::Uninitialized => Err(RecognitionError::EngineNotInitialized),
            SessionState::Listening => {
                self.state = SessionState::Paused;
                self.watchdog.disarm();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn resume_listening(&mut self) -> Result<()> {
        self.guard_disposed()?;
        if self.state == SessionState::Paused {
            self.state = SessionState::Listening;
            self.watchdog.arm(Instant::now());
        }
        Ok(())
    }

    /// Tear everything down. Terminal: every later call fails with
    /// [`RecognitionError::Disposed`].
    pub fn dispose(&mut self) -> Result<()> {
        self.guard_disposed()?;
        if matches!(self.state, SessionState::Listening | SessionState::Paused) {
            if let Some(backend) = self.active_backend {
                if let Err(err) = self.backend_mut(backend).stop() {
                    warn!(target: "vocalis::engine", error = %err, "backend stop failed during dispose");
                }
            }
            self.audio.stop_recording();
        }
        self.plugins.dispose_all();
        self.watchdog.disarm();
        self.state = SessionState::Disposed;
        info!(target: "vocalis::engine", "engine disposed");
        Ok(())
    }

    // Language and backend control ---------------------------------------

    /// Change the recognition language. Restarts the active backend when
    /// listening; capture keeps running throughout.
    pub fn set_language(&mut self, code: &str) -> Result<()> {
        self.guard_disposed()?;
        let descriptor = language::find(code)
            .ok_or_else(|| RecognitionError::LanguageNotSupported(code.to_string()))?;
        let code = descriptor.code.to_string();
        if code.eq_ignore_ascii_case(&self.language) {
            return Ok(());
        }
        if self.state == SessionState::Uninitialized {
            // No backend yet; the choice is applied at initialize.
            self.language = code.clone();
            self.config.language = code.clone();
            self.bus
                .emit(&EngineEvent::LanguageChanged { language: code });
            return Ok(());
        }

        // A language gap never switches backends behind the caller's back;
        // the caller switches explicitly, then sets the language.
        let backend = self.active()?;
        if !self.backend(backend).supports_language(&code) {
            return Err(RecognitionError::LanguageNotSupported(code));
        }
        self.backend_mut(backend).initialize(&code)?;
        if self.state == SessionState::Listening {
            self.backend_mut(backend).stop()?;
            self.backend_mut(backend).start()?;
        }
        self.language = code.clone();
        self.config.language = code.clone();
        self.bus
            .emit(&EngineEvent::LanguageChanged { language: code });
        Ok(())
    }

    /// Hand the session to the other backend without touching audio capture.
    /// A listening session keeps listening; pending results from the old
    /// backend are delivered first so ordering is preserved.
    pub fn switch_engine(&mut self, target: BackendId) -> Result<()> {
        self.guard_disposed()?;
        if self.state == SessionState::Uninitialized {
            return Err(RecognitionError::EngineNotInitialized);
        }
        let current = self.active()?;
        if current == target {
            return Ok(());
        }

        self.drain_backend_events();

        if !self.backend(target).is_supported() {
            return Err(RecognitionError::EngineSwitchFailed {
                target: target.label().to_string(),
                reason: "backend is not supported on this platform".into(),
            });
        }
        if !self.backend(target).supports_language(&self.language) {
            return Err(RecognitionError::EngineSwitchFailed {
                target: target.label().to_string(),
                reason: format!("language '{}' is not supported", self.language),
            });
        }

        let language = self.language.clone();
        self.backend_mut(target).initialize(&language).map_err(|err| {
            RecognitionError::EngineSwitchFailed {
                target: target.label().to_string(),
                reason: err.to_string(),
            }
        })?;

        // Paused sessions keep their backend running (delivery is what pause
        // suppresses), so the target starts whenever the old one was live.
        let was_live = matches!(self.state, SessionState::Listening | SessionState::Paused);
        if was_live {
            if let Err(err) = self.backend_mut(current).stop() {
                warn!(target: "vocalis::engine", error = %err, "old backend stop failed during switch");
            }
            if let Err(err) = self.backend_mut(target).start() {
                // Restore the old backend so the session stays live.
                let restored = self.backend_mut(current).start();
                if let Err(restore_err) = restored {
                    warn!(
                        target: "vocalis::engine",
                        error = %restore_err,
                        "failed to restore previous backend after aborted switch"
                    );
                    self.audio.stop_recording();
                    self.state = SessionState::Stopped;
                }
                return Err(RecognitionError::EngineSwitchFailed {
                    target: target.label().to_string(),
                    reason: err.to_string(),
                });
            }
            if self.state == SessionState::Listening {
                self.watchdog.arm(Instant::now());
            }
        }

        self.active_backend = Some(target);
        self.stats.record_switch(target);
        self.bus.emit(&EngineEvent::EngineSwitched {
            from: current,
            to: target,
        });
        info!(target: "vocalis::engine", from = %current, to = %target, "engine switched");
        Ok(())
    }

    // Plugins and events --------------------------------------------------

    pub fn register_plugin(&mut self, plugin: Box<dyn RecognitionPlugin>) -> Result<()> {
        self.guard_disposed()?;
        self.plugins.register(plugin)
    }

    pub fn unregister_plugin(&mut self, name: &str) -> Result<()> {
        self.guard_disposed()?;
        self.plugins.unregister(name)
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Result<Subscription>
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.guard_disposed()?;
        Ok(self.bus.subscribe(kind, callback))
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        self.guard_disposed()?;
        self.bus.unsubscribe(subscription);
        Ok(())
    }

    // Scheduling ----------------------------------------------------------

    /// Drive the engine: pull conditioned audio frames through the plugin
    /// pipeline into the backend, deliver pending backend events, and run
    /// the watchdog and retry clocks. Call this once per event-loop turn.
    pub fn pump(&mut self) {
        if !matches!(self.state, SessionState::Listening | SessionState::Paused) {
            return;
        }

        if self.state == SessionState::Paused {
            // Capture stays open but nothing is delivered or queued.
            while self.audio.next_frame().is_some() {}
            if let Some(backend) = self.active_backend {
                while self.backend_mut(backend).try_next_event().is_some() {}
            }
            return;
        }

        if self.recovery.take_due(Instant::now()) {
            self.attempt_recovery_switch();
        }

        while let Some(frame) = self.audio.next_frame() {
            let frame = self.plugins.run_audio_pipeline(frame);
            if let Some(hint) = self.plugins.detect_language(&frame) {
                self.pending_language_hint = Some(hint);
            }
            if let Some(backend) = self.active_backend {
                self.backend_mut(backend).push_audio(&frame);
            }
        }

        self.drain_backend_events();

        if self.state == SessionState::Listening {
            let threshold = self.watchdog.threshold_ms();
            if self.watchdog.expired(Instant::now()) {
                self.handle_backend_error(RecognitionError::Timeout(threshold));
            }
        }
    }

    // Introspection -------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn current_language(&self) -> &str {
        &self.language
    }

    pub fn current_backend(&self) -> Option<BackendId> {
        self.active_backend
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn statistics(&self) -> PerformanceStatistics {
        self.stats.snapshot()
    }

    pub fn audio_metrics(&self) -> AudioMetrics {
        self.audio.metrics()
    }

    /// Offline-mode passthrough to the audio processor, for hosts that feed
    /// prerecorded PCM instead of capturing from a device.
    pub fn feed_pcm(&mut self, samples: &[f32]) {
        self.audio.feed_pcm(samples);
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.state.label(),
            is_listening: self.is_listening(),
            session_id: self.session_id.clone(),
            backend: self.active_backend,
            language: self.language.clone(),
            audio: self.audio.metrics(),
            recovery_attempts: self.recovery.attempts(),
            plugins: self.plugins.names(),
        }
    }

    // Internals -----------------------------------------------------------

    fn guard_disposed(&self) -> Result<()> {
        if self.state == SessionState::Disposed {
            return Err(RecognitionError::Disposed);
        }
        Ok(())
    }

    fn active(&self) -> Result<BackendId> {
        self.active_backend
            .ok_or(RecognitionError::EngineNotInitialized)
    }

    fn backend(&self, id: BackendId) -> &dyn SpeechBackend {
        match id {
            BackendId::Native => self.native.as_ref(),
            BackendId::Neural => self.neural.as_ref(),
        }
    }

    fn backend_mut(&mut self, id: BackendId) -> &mut dyn SpeechBackend {
        match id {
            BackendId::Native => self.native.as_mut(),
            BackendId::Neural => self.neural.as_mut(),
        }
    }

    fn apply_config(&mut self, config: RecognitionConfig) {
        self.recovery_policy =
            RecoveryPolicy::new(config.max_recovery_retries, config.recovery_backoff_ms);
        self.watchdog = Watchdog::new(config.result_timeout_ms);
        self.audio.set_noise_reduction(config.noise_reduction);
        self.audio
            .set_noise_reduction_level(config.noise_reduction_level);
        self.config = config;
    }

    fn drain_backend_events(&mut self) {
        let Some(backend) = self.active_backend else {
            return;
        };
        loop {
            let event = self.backend_mut(backend).try_next_event();
            match event {
                Some(BackendEvent::Result(result)) => self.deliver_result(result),
                Some(BackendEvent::Error(error)) => self.handle_backend_error(error),
                None => break,
            }
        }
    }

    fn deliver_result(&mut self, mut result: SpeechResult) {
        // Results that arrive after stop or pause are discarded.
        if self.state != SessionState::Listening {
            return;
        }
        let Some(backend) = self.active_backend else {
            return;
        };
        self.watchdog.touch(Instant::now());

        if !result.is_final && !self.config.interim_results {
            return;
        }
        if result.confidence < self.config.confidence_threshold {
            debug!(
                target: "vocalis::engine",
                confidence = result.confidence,
                "result below confidence threshold"
            );
            return;
        }

        let metrics = self.audio.metrics();
        result.metadata.backend = backend;
        result.metadata.noise_level = self.audio.noise_level();
        if result.metadata.audio_level == 0.0 {
            result.metadata.audio_level = metrics.volume;
        }
        if result.metadata.signal_quality == 0.0 {
            result.metadata.signal_quality = (metrics.signal_to_noise_ratio / 30.0).clamp(0.0, 1.0);
        }
        if result.timestamp_ms == 0 {
            result.timestamp_ms = now_ms();
        }
        if result.language.is_empty() {
            result.language = self.language.clone();
        }
        result
            .alternatives
            .truncate(self.config.max_alternatives as usize);

        let mut result = self.plugins.run_result_pipeline(result);

        let verdict = self.pending_language_hint.take().or_else(|| {
            if self.config.auto_language_detection && result.is_final {
                self.detector
                    .detect(&result.transcript)
                    .map(|code| code.to_string())
            } else {
                None
            }
        });
        if let Some(code) = verdict {
            result.language = code.clone();
            if self.config.auto_language_detection
                && !code.eq_ignore_ascii_case(&self.language)
                && self.backend(backend).supports_language(&code)
            {
                self.language = code.clone();
                self.config.language = code.clone();
                self.bus
                    .emit(&EngineEvent::LanguageChanged { language: code });
            }
        }

        if result.is_final {
            self.stats.record_result(&result);
            self.recovery.reset();
        }
        let is_final = result.is_final;
        self.bus.emit(&EngineEvent::Result(result));

        if is_final && !self.config.continuous {
            if let Err(err) = self.stop_listening() {
                warn!(target: "vocalis::engine", error = %err, "auto-stop after final result failed");
            }
        }
    }

    fn handle_backend_error(&mut self, error: RecognitionError) {
        self.stats.record_error(&error);
        warn!(target: "vocalis::engine", error = %error, "backend error");
        self.bus.emit(&EngineEvent::Error(error.clone()));

        if error.recoverable()
            && self.config.auto_engine_selection
            && self.state == SessionState::Listening
        {
            match self.recovery.schedule(&self.recovery_policy, Instant::now()) {
                Some(delay) => {
                    debug!(
                        target: "vocalis::engine",
                        attempt = self.recovery.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "engine switch retry scheduled"
                    );
                }
                None => {
                    warn!(
                        target: "vocalis::engine",
                        hint = error.user_hint(),
                        "recovery budget exhausted"
                    );
                }
            }
        }
    }

    fn attempt_recovery_switch(&mut self) {
        let Some(current) = self.active_backend else {
            return;
        };
        let target = current.other();
        if !self.backend(target).is_supported()
            || !self.backend(target).supports_language(&self.language)
        {
            warn!(
                target: "vocalis::engine",
                "no alternate backend available for recovery"
            );
            return;
        }
        if let Err(err) = self.switch_engine(target) {
            warn!(target: "vocalis::engine", error = %err, "recovery switch failed");
            // Consume another attempt; the next pump retries if budget
            // remains.
            let _ = self.recovery.schedule(&self.recovery_policy, Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ProcessorConfig;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Backend double driven entirely by the test: events are queued up
    /// front and handed out one per poll.
    struct ScriptedBackend {
        id: BackendId,
        supported: bool,
        events: VecDeque<BackendEvent>,
        running: bool,
        initialized_with: Option<String>,
        fail_initialize: bool,
        pushed_frames: usize,
    }

    impl ScriptedBackend {
        fn new(id: BackendId) -> Self {
            Self {
                id,
                supported: true,
                events: VecDeque::new(),
                running: false,
                initialized_with: None,
                fail_initialize: false,
                pushed_frames: 0,
            }
        }

        fn queue_result(&mut self, transcript: &str, confidence: f32) {
            self.events.push_back(BackendEvent::Result(SpeechResult::simple(
                transcript, confidence, "",
            )));
        }

        fn queue_error(&mut self, error: RecognitionError) {
            self.events.push_back(BackendEvent::Error(error));
        }
    }

    impl SpeechBackend for ScriptedBackend {
        fn id(&self) -> BackendId {
            self.id
        }
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn initialize(&mut self, language: &str) -> crate::error::Result<()> {
            if self.fail_initialize {
                return Err(RecognitionError::ModelLoadFailed("scripted".into()));
            }
            self.initialized_with = Some(language.to_string());
            Ok(())
        }
        fn start(&mut self) -> crate::error::Result<()> {
            if self.initialized_with.is_none() {
                return Err(RecognitionError::EngineNotInitialized);
            }
            self.running = true;
            Ok(())
        }
        fn stop(&mut self) -> crate::error::Result<()> {
            self.running = false;
            Ok(())
        }
        fn supports_language(&self, code: &str) -> bool {
            crate::language::supports(self.id, code)
        }
        fn push_audio(&mut self, _samples: &[f32]) {
            self.pushed_frames += 1;
        }
        fn try_next_event(&mut self) -> Option<BackendEvent> {
            self.events.pop_front()
        }
    }

    /// Handle pair used to reach into a backend after it is boxed.
    struct SharedBackend(Rc<RefCell<ScriptedBackend>>);

    impl SpeechBackend for SharedBackend {
        fn id(&self) -> BackendId {
            self.0.borrow().id
        }
        fn is_supported(&self) -> bool {
            self.0.borrow().supported
        }
        fn initialize(&mut self, language: &str) -> crate::error::Result<()> {
            self.0.borrow_mut().initialize(language)
        }
        fn start(&mut self) -> crate::error::Result<()> {
            self.0.borrow_mut().start()
        }
        fn stop(&mut self) -> crate::error::Result<()> {
            self.0.borrow_mut().stop()
        }
        fn supports_language(&self, code: &str) -> bool {
            self.0.borrow().supports_language(code)
        }
        fn push_audio(&mut self, samples: &[f32]) {
            self.0.borrow_mut().push_audio(samples)
        }
        fn try_next_event(&mut self) -> Option<BackendEvent> {
            self.0.borrow_mut().try_next_event()
        }
    }

    fn shared(id: BackendId) -> (Rc<RefCell<ScriptedBackend>>, Box<dyn SpeechBackend>) {
        let inner = Rc::new(RefCell::new(ScriptedBackend::new(id)));
        (Rc::clone(&inner), Box::new(SharedBackend(inner)))
    }

    fn engine() -> (
        Rc<RefCell<ScriptedBackend>>,
        Rc<RefCell<ScriptedBackend>>,
        RecognitionEngine,
    ) {
        let (native, native_box) = shared(BackendId::Native);
        let (neural, neural_box) = shared(BackendId::Neural);
        let audio = AudioProcessor::offline(ProcessorConfig::default());
        let engine = RecognitionEngine::new(audio, native_box, neural_box);
        (native, neural, engine)
    }

    fn speed_config() -> RecognitionConfig {
        RecognitionConfig {
            performance_preference: crate::config::PerformancePreference::Speed,
            ..RecognitionConfig::default()
        }
    }

    fn collected_results(engine: &RecognitionEngine) -> Rc<RefCell<Vec<SpeechResult>>> {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let inner = Rc::clone(&sink);
        engine
            .subscribe(EventKind::Result, move |event| {
                if let EngineEvent::Result(result) = event {
                    inner.borrow_mut().push(result.clone());
                }
            })
            .expect("subscribe");
        sink
    }

    #[test]
    fn lifecycle_guards_hold() {
        let (_, _, mut engine) = engine();
        assert_eq!(
            engine.start_listening(None),
            Err(RecognitionError::EngineNotInitialized)
        );

        engine.initialize("en-US").expect("initialize");
        assert_eq!(
            engine.initialize("en-US"),
            Err(RecognitionError::AlreadyInitialized)
        );
        assert!(
            !RecognitionError::AlreadyInitialized.recoverable(),
            "a retry loop keyed on recoverable() must not spin here"
        );
        assert_eq!(engine.state(), SessionState::Initialized);

        engine.start_listening(None).expect("start");
        assert!(engine.is_listening());
        engine.pause_listening().expect("pause");
        assert_eq!(engine.state(), SessionState::Paused);
        engine.resume_listening().expect("resume");
        assert!(engine.is_listening());
        engine.stop_listening().expect("stop");
        engine.stop_listening().expect("stop is idempotent");
        assert_eq!(engine.state(), SessionState::Stopped);

        engine.dispose().expect("dispose");
        assert_eq!(engine.start_listening(None), Err(RecognitionError::Disposed));
        assert_eq!(engine.stop_listening(), Err(RecognitionError::Disposed));
        assert_eq!(
            engine.set_language("fr-FR"),
            Err(RecognitionError::Disposed)
        );
        assert_eq!(engine.dispose(), Err(RecognitionError::Disposed));
    }

    #[test]
    fn results_flow_through_pump_into_stats_and_events() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native.borrow_mut().queue_result("hello world", 0.9);
        engine.pump();

        let results = sink.borrow();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].transcript, "hello world");
        assert_eq!(results[0].language, "en-US");
        assert_eq!(results[0].metadata.backend, BackendId::Native);
        assert!(results[0].timestamp_ms > 0);

        let stats = engine.statistics();
        assert_eq!(stats.total_recognitions, 1);
        assert_eq!(stats.backend_usage["native"], 1);
        assert_eq!(stats.language_usage["en-US"], 1);
    }

    #[test]
    fn low_confidence_results_are_dropped() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(RecognitionConfig {
            confidence_threshold: 0.5,
            ..speed_config()
        });
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native.borrow_mut().queue_result("mumble", 0.2);
        native.borrow_mut().queue_result("clear speech", 0.8);
        engine.pump();

        assert_eq!(sink.borrow().len(), 1);
        assert_eq!(engine.statistics().total_recognitions, 1);
    }

    #[test]
    fn audio_frames_reach_the_backend() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");

        engine.feed_pcm(&vec![0.25f32; 1024]);
        engine.pump();
        assert_eq!(native.borrow().pushed_frames, 2);
    }

    #[test]
    fn switch_preserves_listening_and_emits_event() {
        let (native, neural, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        let switches = Rc::new(RefCell::new(Vec::new()));
        {
            let inner = Rc::clone(&switches);
            engine
                .subscribe(EventKind::EngineSwitched, move |event| {
                    if let EngineEvent::EngineSwitched { from, to } = event {
                        inner.borrow_mut().push((*from, *to));
                    }
                })
                .expect("subscribe");
        }

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        assert_eq!(engine.current_backend(), Some(BackendId::Native));

        engine.switch_engine(BackendId::Neural).expect("switch");
        assert!(engine.is_listening(), "switch must not interrupt listening");
        assert_eq!(engine.current_backend(), Some(BackendId::Neural));
        assert!(!native.borrow().running);
        assert!(neural.borrow().running);
        assert_eq!(
            switches.borrow().as_slice(),
            &[(BackendId::Native, BackendId::Neural)]
        );
        assert_eq!(engine.statistics().switch_count, 1);

        // Switching to the current backend is a no-op.
        engine.switch_engine(BackendId::Neural).expect("no-op");
        assert_eq!(engine.statistics().switch_count, 1);
    }

    #[test]
    fn switch_fails_cleanly_when_target_cannot_serve() {
        let (_, neural, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");

        neural.borrow_mut().supported = false;
        let err = engine.switch_engine(BackendId::Neural).unwrap_err();
        assert!(matches!(err, RecognitionError::EngineSwitchFailed { .. }));
        assert!(engine.is_listening(), "failed switch leaves session intact");
        assert_eq!(engine.current_backend(), Some(BackendId::Native));
    }

    #[test]
    fn recoverable_error_switches_backend_after_backoff() {
        let (native, neural, engine) = engine();
        let mut engine = engine.with_config(RecognitionConfig {
            recovery_backoff_ms: 1,
            ..speed_config()
        });
        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");

        native
            .borrow_mut()
            .queue_error(RecognitionError::NetworkError("offline".into()));
        engine.pump();
        assert_eq!(engine.current_backend(), Some(BackendId::Native));

        std::thread::sleep(std::time::Duration::from_millis(5));
        engine.pump();
        assert_eq!(engine.current_backend(), Some(BackendId::Neural));
        assert!(engine.is_listening());
        assert!(neural.borrow().running);

        let stats = engine.statistics();
        assert_eq!(stats.switch_count, 1);
        assert!((stats.error_rate - 1.0).abs() < 1e-9, "one error, no results");
    }

    #[test]
    fn non_recoverable_error_does_not_switch() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(RecognitionConfig {
            recovery_backoff_ms: 1,
            ..speed_config()
        });
        let errors = Rc::new(RefCell::new(0u32));
        {
            let inner = Rc::clone(&errors);
            engine
                .subscribe(EventKind::Error, move |_| *inner.borrow_mut() += 1)
                .expect("subscribe");
        }

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native
            .borrow_mut()
            .queue_error(RecognitionError::PermissionDenied("mic".into()));
        engine.pump();
        std::thread::sleep(std::time::Duration::from_millis(5));
        engine.pump();

        assert_eq!(engine.current_backend(), Some(BackendId::Native));
        assert_eq!(*errors.borrow(), 1);
    }

    #[test]
    fn paused_session_discards_results() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        engine.pause_listening().expect("pause");
        native.borrow_mut().queue_result("while paused", 0.9);
        engine.pump();
        engine.resume_listening().expect("resume");
        engine.pump();

        assert!(sink.borrow().is_empty(), "paused results are discarded");
        assert_eq!(engine.statistics().total_recognitions, 0);
    }

    #[test]
    fn late_results_after_stop_are_discarded() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native.borrow_mut().queue_result("too late", 0.9);
        engine.stop_listening().expect("stop");
        engine.pump();

        assert!(sink.borrow().is_empty());
    }

    #[test]
    fn one_shot_mode_stops_after_first_final_result() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(RecognitionConfig {
            continuous: false,
            ..speed_config()
        });
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native.borrow_mut().queue_result("first", 0.9);
        native.borrow_mut().queue_result("second", 0.9);
        engine.pump();

        assert_eq!(sink.borrow().len(), 1);
        assert_eq!(engine.state(), SessionState::Stopped);
    }

    #[test]
    fn detector_moves_language_and_emits_change() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(RecognitionConfig {
            auto_language_detection: true,
            ..speed_config()
        });
        let changes = Rc::new(RefCell::new(Vec::new()));
        {
            let inner = Rc::clone(&changes);
            engine
                .subscribe(EventKind::LanguageChanged, move |event| {
                    if let EngineEvent::LanguageChanged { language } = event {
                        inner.borrow_mut().push(language.clone());
                    }
                })
                .expect("subscribe");
        }

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        native.borrow_mut().queue_result("hola mundo gracias", 0.9);
        engine.pump();

        assert_eq!(engine.current_language(), "es-ES");
        assert_eq!(changes.borrow().as_slice(), &["es-ES".to_string()]);
    }

    #[test]
    fn set_language_round_trips_and_rejects_unknown() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        engine.initialize("en-US").expect("initialize");

        engine.set_language("fr-FR").expect("set");
        assert_eq!(engine.current_language(), "fr-FR");
        assert_eq!(
            native.borrow().initialized_with.as_deref(),
            Some("fr-FR")
        );

        assert_eq!(
            engine.set_language("xx-YY"),
            Err(RecognitionError::LanguageNotSupported("xx-YY".into()))
        );
        assert_eq!(engine.current_language(), "fr-FR");
    }

    #[test]
    fn set_language_gap_errors_instead_of_switching() {
        let (_, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        engine.initialize("en-US").expect("initialize");
        assert_eq!(engine.current_backend(), Some(BackendId::Native));

        // Yoruba is neural-only in the registry; the session must not hand
        // itself to the other backend.
        assert_eq!(
            engine.set_language("yo"),
            Err(RecognitionError::LanguageNotSupported("yo".into()))
        );
        assert_eq!(engine.current_backend(), Some(BackendId::Native));
        assert_eq!(engine.current_language(), "en-US");

        // After an explicit switch the same code is accepted.
        engine.switch_engine(BackendId::Neural).expect("switch");
        engine.set_language("yo").expect("set");
        assert_eq!(engine.current_language(), "yo");
    }

    #[test]
    fn switch_while_paused_keeps_target_backend_live() {
        let (native, neural, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        let sink = collected_results(&engine);

        engine.initialize("en-US").expect("initialize");
        engine.start_listening(None).expect("start");
        engine.pause_listening().expect("pause");
        engine.switch_engine(BackendId::Neural).expect("switch");
        assert!(!native.borrow().running);
        assert!(
            neural.borrow().running,
            "a paused session keeps its backend running"
        );
        assert_eq!(engine.state(), SessionState::Paused);

        engine.resume_listening().expect("resume");
        neural.borrow_mut().queue_result("after resume", 0.9);
        engine.pump();

        let results = sink.borrow();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.backend, BackendId::Neural);
    }

    #[test]
    fn explicit_backend_override_wins() {
        let (_, _, mut engine) = engine();
        engine.set_preferred_backend(Some(BackendId::Neural));
        engine.initialize("en-US").expect("initialize");
        assert_eq!(engine.current_backend(), Some(BackendId::Neural));
    }

    #[test]
    fn initialize_falls_back_when_selected_backend_fails() {
        let (native, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        native.borrow_mut().fail_initialize = true;
        engine.initialize("en-US").expect("initialize");
        assert_eq!(engine.current_backend(), Some(BackendId::Neural));
    }

    #[test]
    fn status_reflects_the_session() {
        let (_, _, engine) = engine();
        let mut engine = engine.with_config(speed_config());
        engine.initialize("de-DE").expect("initialize");
        engine.start_listening(None).expect("start");

        let status = engine.status();
        assert_eq!(status.state, "listening");
        assert!(status.is_listening);
        assert_eq!(status.language, "de-DE");
        assert_eq!(status.backend, Some(BackendId::Native));
        assert!(status.session_id.is_some());
    }
}
