#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state management for Farm Royale.
//!
//! The [`World`] is the single writer of battle session state. Adapters and
//! systems never touch it directly: they submit [`Command`] values through
//! [`apply`] and observe the [`Event`] values it broadcasts. The battle
//! countdown lives inside the world and is started and stopped by the session
//! itself; elixir regeneration steps arrive as [`Command::RegenerateElixir`]
//! and are ignored unless a battle is active, so a stale step can never mutate
//! an ended battle.

mod catalog;
mod clock;
mod deck;
mod elixir;
mod random;
mod rewards;

use std::time::Duration;

use farm_royale_core::{
    ArenaPoint, BattleError, BattleOutcome, BattleRecord, CardId, Command, Event,
    RandomSource, ResourceType, TowerSide, ACCELERATED_ELIXIR_RATE, ACCELERATION_THRESHOLD,
    BATTLE_DURATION, ELIXIR_MAX, NORMAL_ELIXIR_RATE, STARTING_ELIXIR, TOWERS_PER_SIDE,
};
use log::{debug, info, warn};

use crate::{
    catalog::Catalog,
    clock::BattleClock,
    deck::Deck,
    elixir::ElixirPool,
    rewards::{settle, PlayerProgress},
};

pub use random::SeededRandom;

const DEFAULT_RNG_SEED: u64 = 0x6661_726d_726f_7961;

/// Tunable battle parameters. [`Config::default`] reproduces the standard ruleset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    battle_duration: Duration,
    acceleration_threshold: Duration,
    elixir_max: f32,
    starting_elixir: f32,
    normal_rate: f32,
    accelerated_rate: f32,
    towers_per_side: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates the standard ruleset seeded with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            battle_duration: BATTLE_DURATION,
            acceleration_threshold: ACCELERATION_THRESHOLD,
            elixir_max: ELIXIR_MAX,
            starting_elixir: STARTING_ELIXIR,
            normal_rate: NORMAL_ELIXIR_RATE,
            accelerated_rate: ACCELERATED_ELIXIR_RATE,
            towers_per_side: TOWERS_PER_SIDE,
            rng_seed,
        }
    }

    /// Overrides how long a battle lasts before timing out.
    #[must_use]
    pub const fn with_battle_duration(mut self, duration: Duration) -> Self {
        self.battle_duration = duration;
        self
    }

    /// Overrides the remaining time at which regeneration accelerates.
    #[must_use]
    pub const fn with_acceleration_threshold(mut self, threshold: Duration) -> Self {
        self.acceleration_threshold = threshold;
        self
    }

    /// Overrides the normal and accelerated regeneration rates.
    #[must_use]
    pub const fn with_elixir_rates(mut self, normal: f32, accelerated: f32) -> Self {
        self.normal_rate = normal;
        self.accelerated_rate = accelerated;
        self
    }

    /// Overrides the number of towers each side starts with. Clamped to at least one.
    #[must_use]
    pub const fn with_towers_per_side(mut self, towers: u32) -> Self {
        self.towers_per_side = if towers == 0 { 1 } else { towers };
        self
    }

    /// Seed used by the default random source.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RNG_SEED)
    }
}

/// Represents the authoritative Farm Royale battle state.
#[derive(Debug)]
pub struct World {
    config: Config,
    catalog: Catalog,
    deck: Deck,
    elixir: ElixirPool,
    clock: BattleClock,
    progress: PlayerProgress,
    active: bool,
    player_towers: u32,
    enemy_towers: u32,
    random: Box<dyn RandomSource>,
}

impl World {
    /// Creates a world holding the starter collection and the standard ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a world holding the starter collection.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_random_source(config, Box::new(SeededRandom::new(config.rng_seed)))
    }

    /// Creates a world drawing every random roll from `random`.
    #[must_use]
    pub fn with_random_source(config: Config, mut random: Box<dyn RandomSource>) -> Self {
        let catalog = Catalog::starter(random.as_mut());
        Self::assemble(config, catalog, PlayerProgress::new(0), &[], random)
    }

    /// Rebuilds a world from persisted progression.
    ///
    /// The arena is recomputed from the trophy count. A collection too small to
    /// fill a deck is topped up with starter cards, and a deck that is not
    /// exactly eight distinct known cards falls back to the default lineup.
    #[must_use]
    pub fn restore(config: Config, record: BattleRecord) -> Self {
        let mut random: Box<dyn RandomSource> = Box::new(SeededRandom::new(config.rng_seed));
        let mut catalog = Catalog::from_cards(record.cards);
        if catalog.top_up_with_starters(random.as_mut()) > 0 {
            warn!("saved collection is smaller than a deck; added starter cards");
        }
        let progress = PlayerProgress::new(record.trophies);
        if record.arena_level != progress.arena() {
            debug!(
                "stored arena {} disagrees with {} trophies; using arena {}",
                record.arena_level,
                progress.trophies(),
                progress.arena()
            );
        }
        Self::assemble(config, catalog, progress, &record.deck, random)
    }

    fn assemble(
        config: Config,
        catalog: Catalog,
        progress: PlayerProgress,
        deck: &[CardId],
        mut random: Box<dyn RandomSource>,
    ) -> Self {
        let deck = match Deck::build(deck, |card| catalog.contains(card), random.as_mut()) {
            Ok(deck) => deck,
            Err(error) => {
                if !deck.is_empty() {
                    warn!("saved deck rejected ({error}); falling back to default lineup");
                }
                default_deck(&catalog, random.as_mut())
            }
        };

        Self {
            catalog,
            deck,
            elixir: ElixirPool::new(config.elixir_max, config.normal_rate, config.accelerated_rate),
            clock: BattleClock::new(config.battle_duration, config.acceleration_threshold),
            progress,
            active: false,
            player_towers: config.towers_per_side,
            enemy_towers: config.towers_per_side,
            random,
            config,
        }
    }

    fn start_battle(&mut self, out_events: &mut Vec<Event>) {
        if self.active {
            debug!("{}; start ignored", BattleError::AlreadyActive);
            return;
        }

        self.elixir.reset(self.config.starting_elixir);
        self.player_towers = self.config.towers_per_side;
        self.enemy_towers = self.config.towers_per_side;
        self.deck.reset(self.random.as_mut());
        self.clock.start();
        self.active = true;
        info!("battle started");

        out_events.push(Event::BattleStarted);
        out_events.push(Event::ElixirChanged {
            current: self.elixir.current(),
            max: self.elixir.max(),
        });
        out_events.push(Event::BattleTimeChanged {
            remaining: self.clock.remaining(),
        });
    }

    fn end_battle(&mut self, outcome: BattleOutcome, out_events: &mut Vec<Event>) {
        if !self.active {
            debug!("{}; end ignored", BattleError::AlreadyIdle);
            return;
        }

        self.active = false;
        self.clock.stop();
        if self.elixir.restore_normal_rate() {
            out_events.push(Event::ElixirRateChanged {
                rate: self.elixir.rate(),
            });
        }
        info!("battle ended: {outcome:?}");
        out_events.push(Event::BattleEnded { outcome });

        self.settle(outcome, out_events);
    }

    fn settle(&mut self, outcome: BattleOutcome, out_events: &mut Vec<Event>) {
        let settlement = settle(outcome, &mut self.progress, self.random.as_mut());

        out_events.push(Event::TrophiesChanged {
            trophies: settlement.trophies,
        });
        if let Some((from, to)) = settlement.arena_change {
            info!("arena changed from {from} to {to}");
            out_events.push(Event::ArenaChanged { from, to });
        }
        out_events.push(Event::ResourceGranted {
            resource: ResourceType::Coins,
            amount: settlement.coins,
        });
        if settlement.gems > 0 {
            out_events.push(Event::ResourceGranted {
                resource: ResourceType::Gems,
                amount: settlement.gems,
            });
        }
        out_events.push(Event::ExperienceGranted {
            amount: settlement.experience,
        });

        info!(
            "settled {:?}: {:+} trophies, {} coins, {} gems",
            settlement.outcome, settlement.trophy_delta, settlement.coins, settlement.gems
        );
        out_events.push(Event::BattleSettled {
            outcome: settlement.outcome,
            trophy_delta: settlement.trophy_delta,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        if !self.active {
            return;
        }

        let Some(step) = self.clock.advance(dt) else {
            return;
        };
        out_events.push(Event::BattleTimeChanged {
            remaining: step.remaining,
        });

        if step.entered_final_phase && self.elixir.accelerate() {
            out_events.push(Event::ElixirRateChanged {
                rate: self.elixir.rate(),
            });
        }

        if step.expired {
            self.end_battle(BattleOutcome::Defeat, out_events);
        }
    }

    fn regenerate_elixir(&mut self, out_events: &mut Vec<Event>) {
        if !self.active {
            return;
        }
        if let Some(current) = self.elixir.regenerate() {
            out_events.push(Event::ElixirChanged {
                current,
                max: self.elixir.max(),
            });
        }
    }

    fn play_card(
        &mut self,
        slot: usize,
        position: ArenaPoint,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BattleError> {
        if !self.active {
            return Err(BattleError::NotActive);
        }

        let card_id = self.deck.card_at(slot)?;
        let card = self.catalog.get(card_id)?;
        let kind = card.kind();
        let remaining = self.elixir.spend(card.cost())?;
        let (played, replacement) = self.deck.play(slot, self.random.as_mut())?;
        debug!("played card {} from slot {slot} as {kind:?}", played.get());

        out_events.push(Event::ElixirChanged {
            current: remaining,
            max: self.elixir.max(),
        });
        out_events.push(Event::CardPlayed {
            slot,
            card: played,
            kind,
            position,
            replacement,
        });
        Ok(())
    }

    fn destroy_tower(&mut self, side: TowerSide, out_events: &mut Vec<Event>) {
        if !self.active {
            debug!("tower destroyed outside of a battle; ignored");
            return;
        }

        let towers = match side {
            TowerSide::Player => &mut self.player_towers,
            TowerSide::Enemy => &mut self.enemy_towers,
        };
        *towers = towers.saturating_sub(1);
        let remaining = *towers;
        out_events.push(Event::TowerDestroyed { side, remaining });

        if remaining == 0 {
            self.end_battle(side.outcome_when_razed(), out_events);
        }
    }

    fn change_deck(&mut self, cards: &[CardId]) -> Result<(), BattleError> {
        let catalog = &self.catalog;
        self.deck = Deck::build(cards, |card| catalog.contains(card), self.random.as_mut())?;
        Ok(())
    }

    fn upgrade_card(&mut self, card: CardId) -> Result<u32, BattleError> {
        self.catalog.get_mut(card)?.upgrade()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn default_deck(catalog: &Catalog, random: &mut dyn RandomSource) -> Deck {
    Deck::from_lineup(catalog.default_lineup(), random)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartBattle => world.start_battle(out_events),
        Command::EndBattle { player_won } => {
            world.end_battle(BattleOutcome::from_player_won(player_won), out_events);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::RegenerateElixir => world.regenerate_elixir(out_events),
        Command::PlayCard { slot, position } => {
            if let Err(reason) = world.play_card(slot, position, out_events) {
                debug!("card play from slot {slot} rejected: {reason}");
                out_events.push(Event::CardPlayRejected { slot, reason });
            }
        }
        Command::DestroyTower { side } => world.destroy_tower(side, out_events),
        Command::ChangeDeck { cards } => match world.change_deck(&cards) {
            Ok(()) => out_events.push(Event::DeckChanged { cards }),
            Err(reason) => {
                debug!("deck change rejected: {reason}");
                out_events.push(Event::DeckChangeRejected { reason });
            }
        },
        Command::RegisterCard { card } => {
            let card = world.catalog.register(card);
            out_events.push(Event::CardRegistered { card });
        }
        Command::UpgradeCard { card } => match world.upgrade_card(card) {
            Ok(level) => {
                info!("card {} upgraded to level {level}", card.get());
                out_events.push(Event::CardUpgraded { card, level });
            }
            Err(reason) => {
                debug!("upgrade of card {} rejected: {reason}", card.get());
                out_events.push(Event::CardUpgradeRejected { card, reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use farm_royale_core::{
        BattleError, BattleRecord, Card, CardId, HandSlotSnapshot, HandView, SessionSnapshot,
    };

    use super::World;

    /// Reports whether a battle is in progress.
    #[must_use]
    pub fn is_active(world: &World) -> bool {
        world.active
    }

    /// Captures the elixir, countdown and tower state of the session.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            active: world.active,
            elixir: world.elixir.current(),
            elixir_max: world.elixir.max(),
            elixir_rate: world.elixir.rate(),
            remaining: world.clock.remaining(),
            player_towers: world.player_towers,
            enemy_towers: world.enemy_towers,
        }
    }

    /// Captures the cards currently held in the hand.
    #[must_use]
    pub fn hand(world: &World) -> HandView {
        let snapshots = world
            .deck
            .hand()
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| {
                world.catalog.get(*id).ok().map(|card| HandSlotSnapshot {
                    slot,
                    card: *id,
                    cost: card.cost(),
                    kind: card.kind(),
                })
            })
            .collect();
        HandView::from_snapshots(snapshots)
    }

    /// Configured deck in slot order.
    #[must_use]
    pub fn deck(world: &World) -> &[CardId] {
        world.deck.lineup()
    }

    /// Number of cards waiting in the draw queue.
    #[must_use]
    pub fn queued_cards(world: &World) -> usize {
        world.deck.queued()
    }

    /// Looks up a collected card.
    pub fn card(world: &World, id: CardId) -> Result<&Card, BattleError> {
        world.catalog.get(id)
    }

    /// Iterator over every collected card in identifier order.
    pub fn cards(world: &World) -> impl Iterator<Item = &Card> {
        world.catalog.iter()
    }

    /// Coins the next upgrade of a card costs.
    pub fn upgrade_cost(world: &World, id: CardId) -> Result<u64, BattleError> {
        world.catalog.get(id).map(Card::upgrade_cost)
    }

    /// Trophies currently held.
    #[must_use]
    pub fn trophies(world: &World) -> u32 {
        world.progress.trophies()
    }

    /// Arena derived from the trophy count.
    #[must_use]
    pub fn arena_level(world: &World) -> u32 {
        world.progress.arena()
    }

    /// Captures the persisted part of the battle state.
    #[must_use]
    pub fn record(world: &World) -> BattleRecord {
        BattleRecord {
            trophies: world.progress.trophies(),
            arena_level: world.progress.arena(),
            cards: world.catalog.iter().cloned().collect(),
            deck: world.deck.lineup().to_vec(),
        }
    }
}
