//! Capped elixir store with a switchable regeneration rate.

use farm_royale_core::BattleError;

#[derive(Clone, Debug)]
pub(crate) struct ElixirPool {
    current: f32,
    max: f32,
    rate: f32,
    normal_rate: f32,
    accelerated_rate: f32,
}

impl ElixirPool {
    pub(crate) fn new(max: f32, normal_rate: f32, accelerated_rate: f32) -> Self {
        Self {
            current: 0.0,
            max,
            rate: normal_rate,
            normal_rate,
            accelerated_rate,
        }
    }

    /// Refills the pool to `starting` (clamped to the cap) at the normal rate.
    pub(crate) fn reset(&mut self, starting: f32) {
        self.current = starting.clamp(0.0, self.max);
        self.rate = self.normal_rate;
    }

    /// Adds one second of regeneration. Returns the new amount if it changed.
    pub(crate) fn regenerate(&mut self) -> Option<f32> {
        if self.current >= self.max {
            return None;
        }
        self.current = (self.current + self.rate).min(self.max);
        Some(self.current)
    }

    /// Deducts `amount`, returning the remaining elixir.
    pub(crate) fn spend(&mut self, amount: u32) -> Result<f32, BattleError> {
        let cost = amount as f32;
        if cost > self.current {
            return Err(BattleError::InsufficientElixir {
                required: amount,
                available: self.current,
            });
        }
        self.current = (self.current - cost).max(0.0);
        Ok(self.current)
    }

    /// Switches to the accelerated rate. Returns `true` if the rate changed.
    pub(crate) fn accelerate(&mut self) -> bool {
        self.set_rate(self.accelerated_rate)
    }

    /// Switches back to the normal rate. Returns `true` if the rate changed.
    pub(crate) fn restore_normal_rate(&mut self) -> bool {
        self.set_rate(self.normal_rate)
    }

    fn set_rate(&mut self, rate: f32) -> bool {
        let changed = (self.rate - rate).abs() > f32::EPSILON;
        self.rate = rate;
        changed
    }

    pub(crate) fn current(&self) -> f32 {
        self.current
    }

    pub(crate) fn max(&self) -> f32 {
        self.max
    }

    pub(crate) fn rate(&self) -> f32 {
        self.rate
    }
}
