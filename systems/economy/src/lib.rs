#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward bookkeeping system that credits battle rewards to the player.
//!
//! The world decides what a battle pays out and announces it through
//! [`Event::ResourceGranted`] and [`Event::ExperienceGranted`]. This system
//! forwards those grants into a [`ResourceLedger`] and a [`Progression`] and
//! remembers what the latest battle paid.

mod ledger;
mod progression;

use std::collections::BTreeMap;

use farm_royale_core::{Event, ResourceType};
use log::info;

pub use ledger::{ResourceLedger, Wallet};
pub use progression::{PlayerLevel, Progression};

/// Rewards credited since the latest battle ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardSummary {
    resources: BTreeMap<ResourceType, u64>,
    experience: u64,
    levels_gained: u32,
}

impl RewardSummary {
    /// Amount of `resource` credited.
    #[must_use]
    pub fn resource(&self, resource: ResourceType) -> u64 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// Every credited resource in resource order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceType, u64)> + '_ {
        self.resources
            .iter()
            .map(|(resource, amount)| (*resource, *amount))
    }

    /// Experience credited.
    #[must_use]
    pub const fn experience(&self) -> u64 {
        self.experience
    }

    /// Player levels gained from the credited experience.
    #[must_use]
    pub const fn levels_gained(&self) -> u32 {
        self.levels_gained
    }
}

/// Pure system crediting reward events to the player's ledger and progression.
#[derive(Debug, Default)]
pub struct Economy {
    latest: RewardSummary,
}

impl Economy {
    /// Creates an economy system with an empty reward summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewards credited for the latest battle.
    #[must_use]
    pub fn latest_rewards(&self) -> &RewardSummary {
        &self.latest
    }

    /// Consumes world events and credits every grant they announce.
    pub fn handle<L, P>(&mut self, events: &[Event], ledger: &mut L, progression: &mut P)
    where
        L: ResourceLedger + ?Sized,
        P: Progression + ?Sized,
    {
        for event in events {
            match event {
                Event::BattleEnded { .. } => self.latest = RewardSummary::default(),
                Event::ResourceGranted { resource, amount } => {
                    let amount = u64::from(*amount);
                    ledger.add(*resource, amount);
                    let credited = self.latest.resources.entry(*resource).or_insert(0);
                    *credited = credited.saturating_add(amount);
                }
                Event::ExperienceGranted { amount } => {
                    let gained = progression.add_experience(*amount);
                    self.latest.experience =
                        self.latest.experience.saturating_add(u64::from(*amount));
                    self.latest.levels_gained = self.latest.levels_gained.saturating_add(gained);
                    if gained > 0 {
                        info!("player gained {gained} level(s)");
                    }
                }
                _ => {}
            }
        }
    }
}
