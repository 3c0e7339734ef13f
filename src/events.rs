//! Event surface for the orchestrator.
//!
//! Replaces emitter-style global listener arrays with an explicit
//! subscription registry: `subscribe` hands back a [`Subscription`] token and
//! removal goes through `unsubscribe`. Dispatch walks a snapshot of the
//! registry, so callbacks may subscribe or unsubscribe freely without
//! invalidating the iteration in progress.

use crate::backend::{BackendId, SpeechResult};
use crate::error::RecognitionError;
use std::cell::RefCell;
use std::rc::Rc;

/// Events emitted by the engine while a session is live.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// `recognition:result`
    Result(SpeechResult),
    /// `recognition:error`
    Error(RecognitionError),
    /// `engine:switched`
    EngineSwitched { from: BackendId, to: BackendId },
    /// `language:changed`
    LanguageChanged { language: String },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::Result(_) => EventKind::Result,
            EngineEvent::Error(_) => EventKind::Error,
            EngineEvent::EngineSwitched { .. } => EventKind::EngineSwitched,
            EngineEvent::LanguageChanged { .. } => EventKind::LanguageChanged,
        }
    }
}

/// Event channel a subscriber attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Result,
    Error,
    EngineSwitched,
    LanguageChanged,
}

/// Opaque unsubscribe token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Callback = Rc<RefCell<dyn FnMut(&EngineEvent)>>;

struct Entry {
    id: u64,
    kind: EventKind,
    callback: Callback,
}

/// Subscription registry. Single-threaded by design: the engine delivers all
/// events from inside `pump()` on the caller's thread.
pub struct EventBus {
    entries: Rc<RefCell<Vec<Entry>>>,
    next_id: std::cell::Cell<u64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            next_id: std::cell::Cell::new(1),
        }
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            kind,
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription(id)
    }

    /// Remove a subscriber. Unknown tokens are ignored, so double
    /// unsubscription from inside a callback is harmless.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.entries
            .borrow_mut()
            .retain(|entry| entry.id != subscription.0);
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Deliver one event to every matching subscriber in subscription order.
    ///
    /// The registry is snapshotted before delivery; subscribers added during
    /// dispatch see only later events, removed ones are skipped next time.
    pub fn emit(&self, event: &EngineEvent) {
        let kind = event.kind();
        let snapshot: Vec<Callback> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in snapshot {
            // A callback can re-enter the bus, but not itself.
            if let Ok(mut f) = callback.try_borrow_mut() {
                f(event);
            }
        }
    }
}
