use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::EventKind;

/// Time source for cooldown comparisons.
///
/// Injected so tests can step time manually instead of sleeping. The
/// production implementation uses `Instant`, which is immune to
/// wall-clock adjustments.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// Monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-identity, per-kind rate limiter for notifications.
///
/// The ledger records when a notification was last *attempted* for an
/// identity, not whether it was delivered: a stamp is written right
/// after admission so that a downstream composition or speech failure
/// does not re-open the window.
pub struct CooldownGate<C: Clock> {
    welcome_window: Duration,
    goodbye_window: Duration,
    last_welcome: HashMap<String, Instant>,
    last_goodbye: HashMap<String, Instant>,
    clock: C,
}

impl CooldownGate<SystemClock> {
    pub fn new(welcome_window: Duration, goodbye_window: Duration) -> Self {
        Self::with_clock(welcome_window, goodbye_window, SystemClock)
    }
}

impl<C: Clock> CooldownGate<C> {
    pub fn with_clock(welcome_window: Duration, goodbye_window: Duration, clock: C) -> Self {
        Self {
            welcome_window,
            goodbye_window,
            last_welcome: HashMap::new(),
            last_goodbye: HashMap::new(),
            clock,
        }
    }

    fn window(&self, kind: EventKind) -> Duration {
        match kind {
            EventKind::Arrival => self.welcome_window,
            EventKind::Departure => self.goodbye_window,
        }
    }

    fn ledger(&self, kind: EventKind) -> &HashMap<String, Instant> {
        match kind {
            EventKind::Arrival => &self.last_welcome,
            EventKind::Departure => &self.last_goodbye,
        }
    }

    /// True iff no notification of this kind has been recorded for the
    /// identity, or the configured window has fully elapsed since the
    /// last one.
    pub fn admit(&self, identity: &str, kind: EventKind) -> bool {
        let Some(last) = self.ledger(kind).get(identity) else {
            return true;
        };
        let elapsed = self.clock.now().saturating_duration_since(*last);
        let admitted = elapsed >= self.window(kind);
        tracing::debug!(
            identity,
            kind = kind.as_str(),
            elapsed_secs = elapsed.as_secs(),
            admitted,
            "cooldown check"
        );
        admitted
    }

    /// Stamp the current time for (identity, kind). Called exactly once
    /// per admitted notification, before composition and speech.
    pub fn record(&mut self, identity: &str, kind: EventKind) {
        let now = self.clock.now();
        match kind {
            EventKind::Arrival => self.last_welcome.insert(identity.to_string(), now),
            EventKind::Departure => self.last_goodbye.insert(identity.to_string(), now),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Manually stepped clock shared between test and gate.
    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<Instant>>);

    impl ManualClock {
        fn start() -> Self {
            Self(Arc::new(Mutex::new(Instant::now())))
        }

        fn advance(&self, d: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += d;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    fn gate(clock: ManualClock) -> CooldownGate<ManualClock> {
        CooldownGate::with_clock(
            Duration::from_secs(3600),
            Duration::from_secs(300),
            clock,
        )
    }

    #[test]
    fn first_notification_is_always_admitted() {
        let gate = gate(ManualClock::start());
        assert!(gate.admit("alice", EventKind::Arrival));
        assert!(gate.admit("alice", EventKind::Departure));
    }

    #[test]
    fn denied_within_window_admitted_at_boundary() {
        let clock = ManualClock::start();
        let mut gate = gate(clock.clone());

        gate.record("alice", EventKind::Arrival);
        assert!(!gate.admit("alice", EventKind::Arrival));

        clock.advance(Duration::from_secs(3599));
        assert!(!gate.admit("alice", EventKind::Arrival));

        clock.advance(Duration::from_secs(1));
        assert!(gate.admit("alice", EventKind::Arrival));
    }

    #[test]
    fn windows_are_independent_per_kind() {
        let clock = ManualClock::start();
        let mut gate = gate(clock.clone());

        gate.record("alice", EventKind::Arrival);
        gate.record("alice", EventKind::Departure);

        // Goodbye window (300s) elapses while welcome (3600s) has not.
        clock.advance(Duration::from_secs(300));
        assert!(gate.admit("alice", EventKind::Departure));
        assert!(!gate.admit("alice", EventKind::Arrival));
    }

    #[test]
    fn ledger_is_per_identity() {
        let mut gate = gate(ManualClock::start());
        gate.record("alice", EventKind::Arrival);
        assert!(!gate.admit("alice", EventKind::Arrival));
        assert!(gate.admit("bob", EventKind::Arrival));
    }

    #[test]
    fn record_resets_the_window() {
        let clock = ManualClock::start();
        let mut gate = gate(clock.clone());

        gate.record("alice", EventKind::Departure);
        clock.advance(Duration::from_secs(300));
        assert!(gate.admit("alice", EventKind::Departure));

        gate.record("alice", EventKind::Departure);
        clock.advance(Duration::from_secs(299));
        assert!(!gate.admit("alice", EventKind::Departure));
    }
}
