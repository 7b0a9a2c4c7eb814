//! Battle countdown driving the late-game phase change and the timeout.

use std::time::Duration;

/// Outcome of advancing a running countdown by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClockStep {
    pub(crate) remaining: Duration,
    /// Set only on the tick that first reaches the acceleration threshold.
    pub(crate) entered_final_phase: bool,
    pub(crate) expired: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct BattleClock {
    duration: Duration,
    threshold: Duration,
    remaining: Duration,
    running: bool,
    final_phase: bool,
}

impl BattleClock {
    pub(crate) fn new(duration: Duration, threshold: Duration) -> Self {
        Self {
            duration,
            threshold,
            remaining: duration,
            running: false,
            final_phase: false,
        }
    }

    pub(crate) fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
        self.final_phase = false;
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
    }

    /// Counts `dt` down. A stopped clock ignores the tick.
    pub(crate) fn advance(&mut self, dt: Duration) -> Option<ClockStep> {
        if !self.running {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(dt);
        let entered_final_phase = !self.final_phase && self.remaining <= self.threshold;
        if entered_final_phase {
            self.final_phase = true;
        }

        Some(ClockStep {
            remaining: self.remaining,
            entered_final_phase,
            expired: self.remaining.is_zero(),
        })
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.remaining
    }
}
