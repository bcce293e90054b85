//! Idle-delay commit timer.
//!
//! The engine is single-threaded and cooperative: nothing here spawns threads or sleeps.
//! The host drives [`History::poll`](crate::History::poll) with its own notion of "now",
//! which also makes the deferral behavior fully deterministic in tests.

use std::time::{Duration, Instant};

/// One-shot deadline with reset-on-touch semantics.
///
/// Re-arming an already armed timer replaces the deadline, so a burst of touches within the
/// delay coalesces into a single commit.
#[derive(Debug, Clone, Copy)]
pub struct CommitTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl CommitTimer {
    /// Create a disarmed timer with the given idle delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured idle delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer: the deadline becomes `now + delay`.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm the timer.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is set.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the deadline has been reached.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the deadline if it is due. Returns `true` at most once per arming.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_timer_never_fires() {
        let mut timer = CommitTimer::new(Duration::from_millis(300));
        assert!(!timer.is_armed());
        assert!(!timer.fire(Instant::now()));
    }

    #[test]
    fn test_fire_consumes_the_deadline() {
        let mut timer = CommitTimer::new(Duration::from_millis(300));
        let t0 = Instant::now();
        timer.reset(t0);
        assert!(!timer.fire(t0 + Duration::from_millis(299)));
        assert!(timer.fire(t0 + Duration::from_millis(300)));
        assert!(!timer.fire(t0 + Duration::from_millis(301)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_reset_replaces_the_deadline() {
        let mut timer = CommitTimer::new(Duration::from_millis(300));
        let t0 = Instant::now();
        timer.reset(t0);
        timer.reset(t0 + Duration::from_millis(200));
        // The original deadline has been superseded.
        assert!(!timer.fire(t0 + Duration::from_millis(300)));
        assert!(timer.fire(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_clear_disarms() {
        let mut timer = CommitTimer::new(Duration::from_millis(10));
        let t0 = Instant::now();
        timer.reset(t0);
        timer.clear();
        assert!(!timer.fire(t0 + Duration::from_secs(1)));
    }
}
