//! Trophy, arena and reward settlement applied when a battle ends.

use farm_royale_core::{arena_for_trophies, BattleOutcome, RandomSource};

const VICTORY_TROPHIES: (u32, u32) = (25, 35);
const DEFEAT_TROPHIES: (u32, u32) = (15, 25);
const VICTORY_BASE_COINS: u32 = 50;
const VICTORY_COINS_PER_ARENA: u32 = 10;
const DEFEAT_COINS: u32 = 10;
const GEM_CHANCE: f32 = 0.10;
const GEM_REWARD: (u32, u32) = (1, 3);
const VICTORY_EXPERIENCE: u32 = 50;
const DEFEAT_EXPERIENCE: u32 = 10;

/// Trophy count and the arena derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlayerProgress {
    trophies: u32,
    arena: u32,
}

impl PlayerProgress {
    /// The arena is always derived from `trophies`, never trusted from storage.
    pub(crate) const fn new(trophies: u32) -> Self {
        Self {
            trophies,
            arena: arena_for_trophies(trophies),
        }
    }

    pub(crate) const fn trophies(&self) -> u32 {
        self.trophies
    }

    pub(crate) const fn arena(&self) -> u32 {
        self.arena
    }

    /// Applies a signed trophy change, flooring the count at zero.
    fn adjust(&mut self, delta: i64) -> TrophyChange {
        let before = self.trophies;
        let target = (i64::from(before) + delta).clamp(0, i64::from(u32::MAX));
        self.trophies = u32::try_from(target).unwrap_or(u32::MAX);

        let previous_arena = self.arena;
        self.arena = arena_for_trophies(self.trophies);

        TrophyChange {
            applied: i64::from(self.trophies) - i64::from(before),
            arena_change: (previous_arena != self.arena).then_some((previous_arena, self.arena)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TrophyChange {
    applied: i64,
    arena_change: Option<(u32, u32)>,
}

/// Everything a finished battle awards, computed before any grant is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Settlement {
    pub(crate) outcome: BattleOutcome,
    pub(crate) trophy_delta: i32,
    pub(crate) trophies: u32,
    pub(crate) arena_change: Option<(u32, u32)>,
    pub(crate) coins: u32,
    pub(crate) gems: u32,
    pub(crate) experience: u32,
}

/// Rolls the trophy change and rewards for `outcome`, updating `progress`.
pub(crate) fn settle(
    outcome: BattleOutcome,
    progress: &mut PlayerProgress,
    random: &mut dyn RandomSource,
) -> Settlement {
    match outcome {
        BattleOutcome::Victory => {
            let gain = random.random_int(VICTORY_TROPHIES.0, VICTORY_TROPHIES.1);
            let change = progress.adjust(i64::from(gain));
            let coins = VICTORY_BASE_COINS
                .saturating_add(progress.arena().saturating_mul(VICTORY_COINS_PER_ARENA));
            let gems = if random.random_unit() < GEM_CHANCE {
                random.random_int(GEM_REWARD.0, GEM_REWARD.1)
            } else {
                0
            };
            Settlement {
                outcome,
                trophy_delta: clamp_delta(change.applied),
                trophies: progress.trophies(),
                arena_change: change.arena_change,
                coins,
                gems,
                experience: VICTORY_EXPERIENCE,
            }
        }
        BattleOutcome::Defeat => {
            let loss = random.random_int(DEFEAT_TROPHIES.0, DEFEAT_TROPHIES.1);
            let change = progress.adjust(-i64::from(loss));
            Settlement {
                outcome,
                trophy_delta: clamp_delta(change.applied),
                trophies: progress.trophies(),
                arena_change: change.arena_change,
                coins: DEFEAT_COINS,
                gems: 0,
                experience: DEFEAT_EXPERIENCE,
            }
        }
    }
}

fn clamp_delta(delta: i64) -> i32 {
    i32::try_from(delta).unwrap_or(if delta < 0 { i32::MIN } else { i32::MAX })
}
