//! Cancellable one-shot timers driven by the host clock.
//!
//! The core never sleeps. Each timer records a deadline and a generation
//! number; the host asks the session for its next deadline and calls back
//! when it passes. Re-arming or cancelling bumps the generation, so an
//! expiry delivered for an older arming is ignored.

use std::time::{Duration, Instant};

/// Identifies one arming of a [`Timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Timer {
    deadline: Option<Instant>,
    generation: u64,
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer `after` from `now`, cancelling any previous arming.
    pub fn arm(&mut self, now: Instant, after: Duration) -> TimerToken {
        self.cancel();
        self.deadline = Some(now + after);
        TimerToken {
            generation: self.generation,
        }
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.deadline = None;
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Current arming, if any.
    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.deadline.map(|_| TimerToken {
            generation: self.generation,
        })
    }

    /// Consume the expiry if the timer is armed and its deadline has passed.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume an expiry reported for `token`. Stale tokens are a no-op.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.deadline.is_some() && token.generation == self.generation {
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
    fn test_poll_before_deadline() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.arm(start, Duration::from_millis(100));

        assert!(!timer.poll_expired(start + Duration::from_millis(99)));
        assert!(timer.is_armed());
        assert!(timer.poll_expired(start + Duration::from_millis(100)));
        assert!(!timer.is_armed());
        assert!(!timer.poll_expired(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_rearm_invalidates_old_token() {
        let start = Instant::now();
        let mut timer = Timer::new();
        let first = timer.arm(start, Duration::from_millis(100));
        let second = timer.arm(start, Duration::from_millis(300));

        assert!(!timer.fire(first));
        assert!(timer.is_armed());
        assert!(timer.fire(second));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_cancelled_token_is_noop() {
        let start = Instant::now();
        let mut timer = Timer::new();
        let token = timer.arm(start, Duration::from_millis(10));
        timer.cancel();

        assert!(!timer.fire(token));
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.token(), None);
    }

    #[test]
    fn test_token_matches_current_arming() {
        let start = Instant::now();
        let mut timer = Timer::new();
        let token = timer.arm(start, Duration::from_millis(10));
        assert_eq!(timer.token(), Some(token));
    }
}
