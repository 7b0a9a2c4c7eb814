#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Application context wiring the Farm Royale battle world to its systems.
//!
//! [`App`] owns exactly one instance of every component. Commands submitted
//! through [`App::submit`] are applied to the world; the resulting events are
//! fed to the systems, whose commands are applied in turn until nothing is
//! left to do. Every event is also published to the registered listeners.

mod bus;
mod store;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use farm_royale_core::{BattleError, CardId, Command, Event, ResourceType};
use farm_royale_system_economy::{Economy, PlayerLevel, ResourceLedger, RewardSummary, Wallet};
use farm_royale_system_elixir_regeneration::{Config as RegenerationConfig, ElixirRegeneration};
use farm_royale_world::{self as world, query, Config as WorldConfig, World};
use log::{debug, info};

pub use bus::SubscriptionId;
pub use store::{GameStore, JsonFileStore, MemoryStore, SaveData};

/// Parameters of every component the application context creates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    world: WorldConfig,
    regeneration: RegenerationConfig,
}

impl Config {
    /// Creates the standard configuration seeded with `rng_seed`.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            world: WorldConfig::new(rng_seed),
            regeneration: RegenerationConfig::default(),
        }
    }

    /// Replaces the battle world configuration.
    #[must_use]
    pub const fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    /// Overrides the time between two elixir regeneration steps.
    #[must_use]
    pub const fn with_regeneration_interval(mut self, interval: Duration) -> Self {
        self.regeneration = RegenerationConfig::new(interval);
        self
    }
}

/// Top-level context owning the world, its systems and the player's economy.
#[derive(Debug)]
pub struct App {
    world: World,
    regeneration: ElixirRegeneration,
    economy: Economy,
    wallet: Wallet,
    level: PlayerLevel,
    bus: bus::NotificationBus,
}

impl App {
    /// Creates a fresh player with the starter collection and starting currency.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::assemble(
            config,
            World::with_config(config.world),
            Wallet::new(),
            PlayerLevel::default(),
        )
    }

    /// Restores a player from saved progression.
    #[must_use]
    pub fn from_save(config: Config, data: SaveData) -> Self {
        Self::assemble(
            config,
            World::restore(config.world, data.battle),
            Wallet::with_currency(data.coins, data.gems),
            PlayerLevel::new(data.player_level, data.experience),
        )
    }

    /// Loads the player held by `store`, or creates a fresh one when it is empty.
    pub fn load(config: Config, store: &dyn GameStore) -> Result<Self> {
        match store.load().context("failed to load player progression")? {
            Some(data) => {
                info!("restored player with {} trophies", data.battle.trophies);
                Ok(Self::from_save(config, data))
            }
            None => {
                info!("no saved progression; starting a new player");
                Ok(Self::new(config))
            }
        }
    }

    fn assemble(config: Config, world: World, wallet: Wallet, level: PlayerLevel) -> Self {
        Self {
            world,
            regeneration: ElixirRegeneration::new(config.regeneration),
            economy: Economy::new(),
            wallet,
            level,
            bus: bus::NotificationBus::default(),
        }
    }

    /// Applies `command` and every command the systems derive from it.
    ///
    /// Returns all events broadcast along the way, in order.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut broadcast = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.regeneration.handle(&events, &mut pending);
            self.economy.handle(&events, &mut self.wallet, &mut self.level);
            self.bus.publish(&events);
            broadcast.extend(events);
        }

        broadcast
    }

    /// Registers a listener notified of every broadcast event.
    ///
    /// A listener returning an error is logged and the remaining listeners
    /// still receive the event.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Result<()> + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Upgrades a card, paying its coin cost from the wallet.
    ///
    /// Coins are only taken once the card is known to have enough copies.
    /// Returns the new level.
    pub fn upgrade_card(&mut self, id: CardId) -> Result<u32> {
        let card = query::card(&self.world, id)
            .with_context(|| format!("cannot upgrade card {}", id.get()))?;
        if !card.can_upgrade() {
            return Err(BattleError::UpgradeUnavailable {
                owned: card.owned(),
                required: card.required_for_upgrade(),
            })
            .with_context(|| format!("cannot upgrade card {}", id.get()));
        }

        let cost = card.upgrade_cost();
        let available = self.wallet.amount(ResourceType::Coins);
        if !self.wallet.spend(ResourceType::Coins, cost) {
            bail!(
                "upgrading card {} costs {cost} coins but only {available} are available",
                id.get()
            );
        }
        debug!("spent {cost} coins upgrading card {}", id.get());

        let events = self.submit(Command::UpgradeCard { card: id });
        let level = events.iter().find_map(|event| match event {
            Event::CardUpgraded { card, level } if *card == id => Some(*level),
            _ => None,
        });
        match level {
            Some(level) => Ok(level),
            None => {
                self.wallet.add(ResourceType::Coins, cost);
                bail!("card {} was not upgraded; {cost} coins refunded", id.get())
            }
        }
    }

    /// Captures everything worth persisting about the player.
    #[must_use]
    pub fn save_data(&self) -> SaveData {
        SaveData {
            battle: query::record(&self.world),
            coins: self.wallet.amount(ResourceType::Coins),
            gems: self.wallet.amount(ResourceType::Gems),
            player_level: self.level.level(),
            experience: self.level.experience(),
        }
    }

    /// Writes the player's progression to `store`.
    pub fn save(&self, store: &mut dyn GameStore) -> Result<()> {
        store
            .save(&self.save_data())
            .context("failed to save player progression")
    }

    /// Battle world, for use with [`farm_royale_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Player's resource balances.
    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Player's level track.
    #[must_use]
    pub fn level(&self) -> &PlayerLevel {
        &self.level
    }

    /// Rewards credited for the latest battle.
    #[must_use]
    pub fn latest_rewards(&self) -> &RewardSummary {
        self.economy.latest_rewards()
    }
}
