//! Countdown primitive shared by every time-gated behavior in the match.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether a countdown keeps firing after its first threshold crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountdownMode {
    /// Fires once, then stays latched until restarted.
    OneShot,
    /// Fires every time the accumulated time crosses the wait time.
    Repeating,
}

/// Polled countdown that reports when its wait time has elapsed.
///
/// Each call to [`Countdown::on_update`] subtracts the wait time at most once,
/// so a delta spanning several periods carries the remainder into the next
/// update instead of firing multiple times in a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    wait_time: Duration,
    elapsed: Duration,
    mode: CountdownMode,
    paused: bool,
    fired: bool,
}

impl Countdown {
    /// Creates a countdown that fires once after `wait_time`.
    #[must_use]
    pub const fn one_shot(wait_time: Duration) -> Self {
        Self::with_mode(wait_time, CountdownMode::OneShot)
    }

    /// Creates a countdown that fires every `wait_time`.
    #[must_use]
    pub const fn repeating(wait_time: Duration) -> Self {
        Self::with_mode(wait_time, CountdownMode::Repeating)
    }

    const fn with_mode(wait_time: Duration, mode: CountdownMode) -> Self {
        Self {
            wait_time,
            elapsed: Duration::ZERO,
            mode,
            paused: false,
            fired: false,
        }
    }

    /// Configured wait time.
    #[must_use]
    pub const fn wait_time(&self) -> Duration {
        self.wait_time
    }

    /// Zeroes the accumulated time and clears the one-shot latch.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.fired = false;
    }

    /// Restarts the countdown with a new wait time.
    pub fn restart_with(&mut self, wait_time: Duration) {
        self.wait_time = wait_time;
        self.restart();
    }

    /// Freezes accumulation until [`Countdown::resume`] is called.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreezes accumulation.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether the countdown is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether a one-shot countdown has already fired since its last restart.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }

    /// Time left before the next threshold crossing.
    ///
    /// Latched one-shot countdowns report zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        if self.fired && self.mode == CountdownMode::OneShot {
            return Duration::ZERO;
        }
        self.wait_time.saturating_sub(self.elapsed)
    }

    /// Accumulates `dt` and returns `true` when the countdown fires.
    pub fn on_update(&mut self, dt: Duration) -> bool {
        if self.paused {
            return false;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.wait_time {
            return false;
        }

        self.elapsed -= self.wait_time;
        let fires = match self.mode {
            CountdownMode::Repeating => true,
            CountdownMode::OneShot => !self.fired,
        };
        self.fired = true;
        fires
    }
}

/// Converts a configured amount of seconds into a [`Duration`].
///
/// Negative and NaN inputs collapse to zero; values too large to represent
/// saturate at [`Duration::MAX`].
#[must_use]
pub fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}
