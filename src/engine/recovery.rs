//! Failure recovery: bounded retries with exponential backoff, plus a
//! result-silence watchdog that fires when a listening backend goes quiet.

use std::time::{Duration, Instant};

/// Retry budget and backoff base, taken from the engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RecoveryPolicy {
    pub fn new(max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            base_backoff: Duration::from_millis(base_backoff_ms),
        }
    }

    /// Delay before attempt number `attempt` (zero-based): base doubled per
    /// prior attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt.min(16))
    }
}

/// Tracks consumed retry attempts and the deadline of the pending one.
#[derive(Debug, Default)]
pub struct RecoveryState {
    attempts: u32,
    pending_at: Option<Instant>,
}

impl RecoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the next retry. Returns the backoff delay, or `None` when the
    /// budget is exhausted.
    pub fn schedule(&mut self, policy: &RecoveryPolicy, now: Instant) -> Option<Duration> {
        if self.attempts >= policy.max_retries {
            return None;
        }
        let delay = policy.backoff_for(self.attempts);
        self.attempts += 1;
        self.pending_at = Some(now + delay);
        Some(delay)
    }

    /// Take the pending retry if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending_at {
            Some(at) if now >= at => {
                self.pending_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_at.is_some()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// A delivered result proves the backend healthy again.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.pending_at = None;
    }
}

/// Fires when no result has arrived for the configured window. Only armed
/// while the engine is listening; paused and stopped sessions never time out.
#[derive(Debug)]
pub struct Watchdog {
    threshold: Duration,
    last_activity: Option<Instant>,
}

impl Watchdog {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold: Duration::from_millis(threshold_ms),
            last_activity: None,
        }
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold.as_millis() as u64
    }

    pub fn arm(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    pub fn disarm(&mut self) {
        self.last_activity = None;
    }

    /// Record backend activity, pushing the deadline out.
    pub fn touch(&mut self, now: Instant) {
        if self.last_activity.is_some() {
            self.last_activity = Some(now);
        }
    }

    /// Check for expiry; an expired watchdog re-arms from `now` so a single
    /// silence produces a single timeout per window.
    pub fn expired(&mut self, now: Instant) -> bool {
        match self.last_activity {
            Some(at) if now.duration_since(at) >= self.threshold => {
                self.last_activity = Some(now);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RecoveryPolicy::new(3, 250);
        assert_eq!(policy.backoff_for(0), Duration::from_millis(250));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
    }

    #[test]
    fn budget_is_enforced() {
        let policy = RecoveryPolicy::new(2, 10);
        let mut state = RecoveryState::new();
        let now = Instant::now();
        assert!(state.schedule(&policy, now).is_some());
        assert!(state.schedule(&policy, now).is_some());
        assert!(state.schedule(&policy, now).is_none(), "budget exhausted");
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn reset_restores_the_budget() {
        let policy = RecoveryPolicy::new(1, 10);
        let mut state = RecoveryState::new();
        let now = Instant::now();
        assert!(state.schedule(&policy, now).is_some());
        assert!(state.schedule(&policy, now).is_none());
        state.reset();
        assert!(state.schedule(&policy, now).is_some());
    }

    #[test]
    fn pending_retry_becomes_due_after_the_delay() {
        let policy = RecoveryPolicy::new(3, 10);
        let mut state = RecoveryState::new();
        let now = Instant::now();
        let delay = state.schedule(&policy, now).expect("scheduled");
        assert!(!state.take_due(now), "not due immediately");
        assert!(state.take_due(now + delay));
        assert!(!state.take_due(now + delay), "consumed");
    }

    #[test]
    fn watchdog_fires_once_per_silent_window() {
        let mut dog = Watchdog::new(100);
        let now = Instant::now();
        dog.arm(now);
        assert!(!dog.expired(now + Duration::from_millis(50)));
        assert!(dog.expired(now + Duration::from_millis(150)));
        assert!(
            !dog.expired(now + Duration::from_millis(200)),
            "re-armed at expiry"
        );
    }

    #[test]
    fn disarmed_watchdog_never_fires() {
        let mut dog = Watchdog::new(1);
        let now = Instant::now();
        assert!(!dog.expired(now + Duration::from_secs(60)));
        dog.arm(now);
        dog.disarm();
        assert!(!dog.expired(now + Duration::from_secs(60)));
    }

    #[test]
    fn touch_pushes_the_deadline() {
        let mut dog = Watchdog::new(100);
        let now = Instant::now();
        dog.arm(now);
        dog.touch(now + Duration::from_millis(80));
        assert!(!dog.expired(now + Duration::from_millis(150)));
        assert!(dog.expired(now + Duration::from_millis(190)));
    }
}
