//! Clocks and trailing-edge debounce timers
//!
//! Nothing here spawns threads or sleeps. The owner polls each `Debounce` with
//! the current time from a `Clock`; tests drive a `ManualClock` forward.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// A single pending action that fires once its window elapses without being
/// rescheduled. Scheduling again replaces both the payload and the deadline.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    window: Duration,
    pending: Option<(Duration, T)>,
}

impl<T> Debounce<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm (or re-arm) the timer with a new payload.
    ///
    /// Returns true when a previously pending payload was replaced.
    pub fn schedule(&mut self, now: Duration, value: T) -> bool {
        self.pending.replace((now + self.window, value)).is_some()
    }

    /// Drop the pending payload, if any
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, value)| value)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the payload if its deadline has passed
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_window() {
        let clock = ManualClock::new();
        let mut timer = Debounce::new(Duration::from_millis(100));

        timer.schedule(clock.now(), 1);
        clock.advance_ms(99);
        assert_eq!(timer.poll(clock.now()), None);
        clock.advance_ms(1);
        assert_eq!(timer.poll(clock.now()), Some(1));
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(clock.now()), None);
    }

    #[test]
    fn test_reschedule_keeps_only_latest() {
        let clock = ManualClock::new();
        let mut timer = Debounce::new(Duration::from_millis(100));

        assert!(!timer.schedule(clock.now(), "a"));
        clock.advance_ms(60);
        assert!(timer.schedule(clock.now(), "b"));
        clock.advance_ms(60);
        // first deadline passed but it was replaced
        assert_eq!(timer.poll(clock.now()), None);
        clock.advance_ms(40);
        assert_eq!(timer.poll(clock.now()), Some("b"));
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut timer = Debounce::new(Duration::from_millis(100));
        timer.schedule(clock.now(), 5);
        assert_eq!(timer.peek(), Some(&5));
        assert_eq!(timer.cancel(), Some(5));
        clock.advance_ms(200);
        assert_eq!(timer.poll(clock.now()), None);
    }
}
