#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic elixir regeneration driven by the world's time events.
//!
//! The system owns no elixir. It converts elapsed battle time into
//! [`Command::RegenerateElixir`] steps, one per whole interval, and stops
//! issuing them as soon as the battle ends.

use std::time::Duration;

use farm_royale_core::{Command, Event};
use log::trace;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration parameters required to construct the regeneration system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a configuration issuing one regeneration step per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Time between two regeneration steps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Pure system that emits regeneration steps while a battle is running.
#[derive(Debug)]
pub struct ElixirRegeneration {
    interval: Duration,
    accumulator: Duration,
    running: bool,
}

impl ElixirRegeneration {
    /// Creates a stopped regeneration system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    /// Reports whether the ticker is currently counting battle time.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Consumes world events and emits one regeneration command per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::BattleStarted => {
                    self.running = true;
                    self.accumulator = Duration::ZERO;
                }
                Event::BattleEnded { .. } => {
                    self.running = false;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } if self.running => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if !self.running {
            return;
        }

        let steps = self.resolve_steps();
        if steps > 0 {
            trace!("issuing {steps} regeneration step(s)");
        }
        out.extend(std::iter::repeat(Command::RegenerateElixir).take(steps));
    }

    fn resolve_steps(&mut self) -> usize {
        if self.interval.is_zero() {
            return 0;
        }

        let mut steps = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            steps += 1;
        }
        steps
    }
}
