//! Double-tap Shift detection.

use crate::timer::{Timer, TimerToken};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(350);
pub const DEFAULT_GRACE: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Maximum gap between the two taps
    pub interval: Duration,
    /// Extra time before an armed tap expires
    pub grace: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            grace: DEFAULT_GRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    ArmedOnce { first_tap_at: Instant },
}

/// Outcome of feeding one Shift press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSignal {
    None,
    DoubleTap,
}

#[derive(Debug)]
pub struct GestureDetector {
    config: GestureConfig,
    state: GestureState,
    timer: Timer,
}

impl GestureDetector {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
            timer: Timer::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> GestureConfig {
        self.config
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    /// Feed a Shift key-down. Auto-repeat presses leave the state untouched.
    pub fn on_shift_down(&mut self, now: Instant, repeat: bool) -> GestureSignal {
        if repeat {
            return GestureSignal::None;
        }

        match self.state {
            GestureState::ArmedOnce { first_tap_at }
                if now.saturating_duration_since(first_tap_at) <= self.config.interval =>
            {
                debug!("Double Shift tap recognized");
                self.reset();
                GestureSignal::DoubleTap
            }
            _ => {
                // Either the first tap or a late second tap that starts over
                self.state = GestureState::ArmedOnce { first_tap_at: now };
                self.timer.arm(now, self.config.interval + self.config.grace);
                GestureSignal::None
            }
        }
    }

    /// Expire the armed tap if its deadline has passed.
    pub fn poll(&mut self, now: Instant) {
        if self.timer.poll_expired(now) {
            debug!("Shift tap expired");
            self.state = GestureState::Idle;
        }
    }

    /// Expire the armed tap for a timer callback. Stale tokens are ignored.
    pub fn on_timer(&mut self, token: TimerToken) {
        if self.timer.fire(token) {
            debug!("Shift tap expired");
            self.state = GestureState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.timer.cancel();
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
