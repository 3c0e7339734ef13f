//! Channel bridge between a concrete recognition engine and an adapter.
//!
//! The platform speech service and the neural inference worker live outside
//! the core. Whoever owns them holds an [`EventFeed`] and pushes results and
//! errors in; the adapter drains the paired [`EventDrain`] from the engine's
//! pump. Bounded so a runaway producer drops instead of ballooning memory.

use super::{BackendEvent, SpeechResult};
use crate::error::RecognitionError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Producer half, held by the host-side engine integration.
#[derive(Clone)]
pub struct EventFeed {
    tx: Sender<BackendEvent>,
}

impl EventFeed {
    pub fn result(&self, result: SpeechResult) {
        self.push(BackendEvent::Result(result));
    }

    pub fn error(&self, error: RecognitionError) {
        self.push(BackendEvent::Error(error));
    }

    fn push(&self, event: BackendEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            warn!(target: "vocalis::backend", "backend event dropped: feed full");
        }
    }
}

/// Consumer half, owned by a backend adapter.
pub struct EventDrain {
    rx: Receiver<BackendEvent>,
}

impl EventDrain {
    pub fn try_next(&self) -> Option<BackendEvent> {
        self.rx.try_recv().ok()
    }

    /// Throw away everything queued, used when a stop discards late results.
    pub fn clear(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create a feed/drain pair with the default capacity.
pub fn event_channel() -> (EventFeed, EventDrain) {
    let (tx, rx) = bounded(DEFAULT_EVENT_CAPACITY);
    (EventFeed { tx }, EventDrain { rx })
}
