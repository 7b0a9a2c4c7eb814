//! Player experience and level.

use serde::{Deserialize, Serialize};

const EXPERIENCE_PER_LEVEL: u64 = 100;

/// Receiver of experience awarded by battles.
pub trait Progression {
    /// Adds experience and returns the number of levels gained.
    fn add_experience(&mut self, amount: u32) -> u32;
}

/// Level track where reaching `level * 100` experience advances one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLevel {
    level: u32,
    experience: u64,
}

impl PlayerLevel {
    /// Creates a level track at `level` (at least one) holding `experience`.
    #[must_use]
    pub const fn new(level: u32, experience: u64) -> Self {
        Self {
            level: if level == 0 { 1 } else { level },
            experience,
        }
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience carried towards the next level.
    #[must_use]
    pub const fn experience(&self) -> u64 {
        self.experience
    }

    /// Experience the current level requires.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.level as u64 * EXPERIENCE_PER_LEVEL
    }
}

impl Default for PlayerLevel {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl Progression for PlayerLevel {
    fn add_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(u64::from(amount));

        let mut gained = 0;
        while self.experience >= self.threshold() {
            self.experience -= self.threshold();
            self.level = self.level.saturating_add(1);
            gained += 1;
        }
        gained
    }
}
