#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Farm Royale battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battle world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that systems
//! and presentation layers react to. Systems consume event streams and respond
//! exclusively with new command batches or calls into external collaborators.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of card slots held in the active hand.
pub const HAND_SIZE: usize = 8;

/// Number of towers each side defends at the start of a battle.
pub const TOWERS_PER_SIDE: u32 = 3;

/// Fixed length of a battle before it times out.
pub const BATTLE_DURATION: Duration = Duration::from_secs(180);

/// Remaining time at or below which elixir regenerates at the accelerated rate.
pub const ACCELERATION_THRESHOLD: Duration = Duration::from_secs(60);

/// Upper bound on stored elixir.
pub const ELIXIR_MAX: f32 = 10.0;

/// Elixir available the moment a battle starts.
pub const STARTING_ELIXIR: f32 = 5.0;

/// Elixir regenerated per second outside the final phase.
pub const NORMAL_ELIXIR_RATE: f32 = 0.35;

/// Elixir regenerated per second during the final phase.
pub const ACCELERATED_ELIXIR_RATE: f32 = 0.70;

/// Trophies required to advance a single arena.
pub const TROPHIES_PER_ARENA: u32 = 300;

/// Derives the arena a player belongs to from their trophy count.
///
/// Arenas start at one and advance every [`TROPHIES_PER_ARENA`] trophies.
#[must_use]
pub const fn arena_for_trophies(trophies: u32) -> u32 {
    trophies / TROPHIES_PER_ARENA + 1
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that a new battle begins. Ignored while a battle is active.
    StartBattle,
    /// Requests that the active battle terminates with the provided result.
    EndBattle {
        /// Whether the local player is credited with the victory.
        player_won: bool,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Applies a single regeneration step at the current elixir rate.
    RegenerateElixir,
    /// Requests that the card held in a hand slot is played into the arena.
    PlayCard {
        /// Zero-based index of the hand slot being played.
        slot: usize,
        /// Arena location the card should be resolved at.
        position: ArenaPoint,
    },
    /// Reports that a tower on the given side was destroyed.
    DestroyTower {
        /// Side that lost the tower.
        side: TowerSide,
    },
    /// Replaces the configured deck with the provided card identifiers.
    ChangeDeck {
        /// Exactly [`HAND_SIZE`] distinct catalog identifiers.
        cards: Vec<CardId>,
    },
    /// Adds a card definition, or further copies of a known card, to the catalog.
    RegisterCard {
        /// Card being granted to the player.
        card: Card,
    },
    /// Requests that a catalog card consumes copies to gain a level.
    UpgradeCard {
        /// Identifier of the card being upgraded.
        card: CardId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a battle became active.
    BattleStarted,
    /// Announces that the active battle terminated.
    BattleEnded {
        /// Result credited to the local player.
        outcome: BattleOutcome,
    },
    /// Reports the countdown after a tick while a battle is active.
    BattleTimeChanged {
        /// Time left before the battle times out.
        remaining: Duration,
    },
    /// Reports that the stored elixir changed.
    ElixirChanged {
        /// Elixir currently available.
        current: f32,
        /// Upper bound on stored elixir.
        max: f32,
    },
    /// Reports that the regeneration rate switched.
    ElixirRateChanged {
        /// Elixir regenerated per second from now on.
        rate: f32,
    },
    /// Confirms that a card left the hand and must be resolved in the arena.
    CardPlayed {
        /// Hand slot the card was played from.
        slot: usize,
        /// Identifier of the played card.
        card: CardId,
        /// Category used to route the card to its resolver.
        kind: CardKind,
        /// Arena location requested by the player.
        position: ArenaPoint,
        /// Card that now occupies the vacated slot.
        replacement: CardId,
    },
    /// Reports that a card play request was rejected.
    CardPlayRejected {
        /// Hand slot named by the request.
        slot: usize,
        /// Specific reason the play failed.
        reason: BattleError,
    },
    /// Confirms that a tower fell.
    TowerDestroyed {
        /// Side that lost the tower.
        side: TowerSide,
        /// Towers that side still defends.
        remaining: u32,
    },
    /// Confirms that the configured deck was replaced.
    DeckChanged {
        /// Identifiers of the new deck in slot order.
        cards: Vec<CardId>,
    },
    /// Reports that a deck change request was rejected.
    DeckChangeRejected {
        /// Specific reason the change failed.
        reason: BattleError,
    },
    /// Confirms that a card was added to the catalog.
    CardRegistered {
        /// Identifier of the registered card.
        card: CardId,
    },
    /// Confirms that a card gained a level.
    CardUpgraded {
        /// Identifier of the upgraded card.
        card: CardId,
        /// Level reached by the upgrade.
        level: u32,
    },
    /// Reports that an upgrade request was rejected.
    CardUpgradeRejected {
        /// Identifier named by the request.
        card: CardId,
        /// Specific reason the upgrade failed.
        reason: BattleError,
    },
    /// Reports the trophy count after a settlement.
    TrophiesChanged {
        /// Trophies currently held.
        trophies: u32,
    },
    /// Reports that the derived arena level changed.
    ArenaChanged {
        /// Arena before the trophy change.
        from: u32,
        /// Arena after the trophy change.
        to: u32,
    },
    /// Requests that the resource ledger credits the player.
    ResourceGranted {
        /// Resource being credited.
        resource: ResourceType,
        /// Amount being credited.
        amount: u32,
    },
    /// Requests that the progression collaborator credits experience.
    ExperienceGranted {
        /// Experience points being credited.
        amount: u32,
    },
    /// Terminal notification emitted once rewards for a battle were issued.
    BattleSettled {
        /// Result credited to the local player.
        outcome: BattleOutcome,
        /// Signed trophy change actually applied.
        trophy_delta: i32,
    },
}

/// Result of a finished battle from the local player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The enemy lost all towers.
    Victory,
    /// The player lost all towers or the countdown expired.
    Defeat,
}

impl BattleOutcome {
    /// Maps the boolean convention used by `EndBattle` to an outcome.
    #[must_use]
    pub const fn from_player_won(player_won: bool) -> Self {
        if player_won {
            Self::Victory
        } else {
            Self::Defeat
        }
    }

    /// Reports whether the local player won.
    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Victory)
    }
}

/// Side of the arena a tower belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerSide {
    /// Towers defended by the local player.
    Player,
    /// Towers defended by the opponent.
    Enemy,
}

impl TowerSide {
    /// Outcome produced when this side runs out of towers.
    #[must_use]
    pub const fn outcome_when_razed(self) -> BattleOutcome {
        match self {
            Self::Player => BattleOutcome::Defeat,
            Self::Enemy => BattleOutcome::Victory,
        }
    }
}

/// Location inside the arena expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaPoint {
    x: f32,
    y: f32,
}

impl ArenaPoint {
    /// Creates a new arena location.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Unique identifier assigned to a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    /// Creates a new card identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Categories of cards, each resolved by a different arena collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Mobile unit that walks toward enemy towers.
    Troop,
    /// Instant effect applied at the target location.
    Spell,
    /// Stationary structure placed on the player's half.
    Building,
    /// Farm animal brought into battle.
    FarmAnimal,
}

/// Combat statistics attached to a card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
    /// Damage dealt per hit.
    pub damage: u32,
    /// Hit points of the deployed unit or building.
    pub health: u32,
    /// Seconds between consecutive attacks.
    pub attack_speed: f32,
    /// Attack reach measured in arena units.
    pub range: f32,
    /// Travel speed measured in arena units per second.
    pub movement_speed: f32,
    /// Whether the unit flies over ground obstacles.
    pub flying: bool,
    /// Whether hits damage everything around the target.
    pub splash: bool,
    /// Radius of the splash area when `splash` is set.
    pub splash_radius: f32,
}

/// Card definition together with the player's progression on it.
///
/// Deserialized cards pass through [`Card::new`] and [`Card::with_progress`],
/// so stored data cannot bypass the cost, level and requirement floors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredCard")]
pub struct Card {
    id: CardId,
    name: String,
    level: u32,
    cost: u32,
    kind: CardKind,
    stats: CardStats,
    owned: u32,
    required_for_upgrade: u32,
}

impl Card {
    /// Copies a freshly granted card starts with.
    pub const STARTING_COPIES: u32 = 1;
    /// Copies the first upgrade consumes.
    pub const STARTING_UPGRADE_REQUIREMENT: u32 = 2;

    /// Creates a level one card holding a single copy.
    ///
    /// The elixir cost is clamped to at least one.
    #[must_use]
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        cost: u32,
        kind: CardKind,
        stats: CardStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            level: 1,
            cost: cost.max(1),
            kind,
            stats,
            owned: Self::STARTING_COPIES,
            required_for_upgrade: Self::STARTING_UPGRADE_REQUIREMENT,
        }
    }

    /// Overrides the progression fields, e.g. when restoring a saved collection.
    ///
    /// Levels and upgrade requirements are clamped to at least one.
    #[must_use]
    pub fn with_progress(mut self, level: u32, owned: u32, required_for_upgrade: u32) -> Self {
        self.level = level.max(1);
        self.owned = owned;
        self.required_for_upgrade = required_for_upgrade.max(1);
        self
    }

    /// Stable identifier of the card.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Display name of the card.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Elixir consumed when the card is played.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Category used to resolve the card in the arena.
    #[must_use]
    pub const fn kind(&self) -> CardKind {
        self.kind
    }

    /// Combat statistics at the current level.
    #[must_use]
    pub const fn stats(&self) -> &CardStats {
        &self.stats
    }

    /// Copies collected toward the next upgrade.
    #[must_use]
    pub const fn owned(&self) -> u32 {
        self.owned
    }

    /// Copies the next upgrade consumes.
    #[must_use]
    pub const fn required_for_upgrade(&self) -> u32 {
        self.required_for_upgrade
    }

    /// Reports whether enough copies were collected to upgrade.
    #[must_use]
    pub const fn can_upgrade(&self) -> bool {
        self.owned >= self.required_for_upgrade
    }

    /// Coins charged by the shop for the next upgrade: `100 * level²`, saturating.
    #[must_use]
    pub const fn upgrade_cost(&self) -> u64 {
        let level = self.level as u64;
        UPGRADE_COST_FACTOR.saturating_mul(level).saturating_mul(level)
    }

    /// Adds collected copies without touching the level.
    pub fn add_copies(&mut self, copies: u32) {
        self.owned = self.owned.saturating_add(copies);
    }

    /// Consumes copies to gain a level, returning the level reached.
    ///
    /// Damage and health grow by ten percent and the next requirement by fifty
    /// percent, rounding halves to even. Nothing changes when too few copies
    /// are held.
    pub fn upgrade(&mut self) -> Result<u32, BattleError> {
        if !self.can_upgrade() {
            return Err(BattleError::UpgradeUnavailable {
                owned: self.owned,
                required: self.required_for_upgrade,
            });
        }

        self.owned -= self.required_for_upgrade;
        self.level = self.level.saturating_add(1);
        self.required_for_upgrade = scale(self.required_for_upgrade, 1.5).max(1);
        self.stats.damage = scale(self.stats.damage, 1.1);
        self.stats.health = scale(self.stats.health, 1.1);
        Ok(self.level)
    }
}

const UPGRADE_COST_FACTOR: u64 = 100;

/// Serialized form of a [`Card`], validated on the way in.
#[derive(Deserialize)]
struct StoredCard {
    id: CardId,
    name: String,
    level: u32,
    cost: u32,
    kind: CardKind,
    stats: CardStats,
    owned: u32,
    required_for_upgrade: u32,
}

impl From<StoredCard> for Card {
    fn from(stored: StoredCard) -> Self {
        Card::new(stored.id, stored.name, stored.cost, stored.kind, stored.stats).with_progress(
            stored.level,
            stored.owned,
            stored.required_for_upgrade,
        )
    }
}

fn scale(value: u32, factor: f64) -> u32 {
    let scaled = (f64::from(value) * factor).round_ties_even();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Resources tracked by the player's ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Harvested grain.
    Grain,
    /// Harvested vegetables.
    Vegetables,
    /// Harvested fruit.
    Fruits,
    /// Milk produced by animals.
    Milk,
    /// Eggs produced by animals.
    Eggs,
    /// Wool produced by animals.
    Wool,
    /// Meat produced by animals.
    Meat,
    /// Construction wood.
    Wood,
    /// Construction stone.
    Stone,
    /// Magic essence.
    Magic,
    /// Soft currency.
    Coins,
    /// Premium currency.
    Gems,
    /// Tickets redeemable on the farm.
    FarmTickets,
    /// Tickets redeemable in battle.
    BattleTickets,
}

/// Reasons an operation on the battle core may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum BattleError {
    /// A deck must contain exactly [`HAND_SIZE`] distinct catalog cards.
    #[error("a deck requires exactly 8 distinct known cards")]
    InvalidDeckSize,
    /// The named hand slot does not exist.
    #[error("hand slot {slot} is out of range")]
    InvalidSlot {
        /// Slot index provided by the caller.
        slot: usize,
    },
    /// The stored elixir does not cover the cost.
    #[error("not enough elixir: {required} required, {available:.2} available")]
    InsufficientElixir {
        /// Elixir the operation needs.
        required: u32,
        /// Elixir currently stored.
        available: f32,
    },
    /// No card with the provided identifier exists in the catalog.
    #[error("unknown card {}", .0.get())]
    UnknownCard(CardId),
    /// Too few copies were collected to upgrade the card.
    #[error("upgrade needs {required} copies, {owned} owned")]
    UpgradeUnavailable {
        /// Copies currently held.
        owned: u32,
        /// Copies the upgrade consumes.
        required: u32,
    },
    /// No battle is in progress.
    #[error("no battle is in progress")]
    NotActive,
    /// A battle is already in progress.
    #[error("a battle is already in progress")]
    AlreadyActive,
    /// No battle is in progress to end.
    #[error("the battle has already ended")]
    AlreadyIdle,
}

/// Uniform random number collaborator consumed by the battle core.
pub trait RandomSource: fmt::Debug {
    /// Returns an integer drawn uniformly from `low..=high`.
    ///
    /// Implementations return `low` when `high < low`.
    fn random_int(&mut self, low: u32, high: u32) -> u32;

    /// Returns a value drawn uniformly from `[0, 1)`.
    fn random_unit(&mut self) -> f32;
}

/// Immutable representation of a single hand slot used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandSlotSnapshot {
    /// Zero-based slot index.
    pub slot: usize,
    /// Card occupying the slot.
    pub card: CardId,
    /// Elixir cost of the card.
    pub cost: u32,
    /// Category of the card.
    pub kind: CardKind,
}

/// Read-only snapshot describing the active hand.
#[derive(Clone, Debug, Default)]
pub struct HandView {
    snapshots: Vec<HandSlotSnapshot>,
}

impl HandView {
    /// Creates a new hand view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HandSlotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the captured slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &HandSlotSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the snapshot of a single slot, if present.
    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&HandSlotSnapshot> {
        self.snapshots.get(slot)
    }
}

/// Read-only snapshot of the battle session state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Whether a battle is in progress.
    pub active: bool,
    /// Elixir currently stored.
    pub elixir: f32,
    /// Upper bound on stored elixir.
    pub elixir_max: f32,
    /// Elixir regenerated per second.
    pub elixir_rate: f32,
    /// Time left before the battle times out.
    pub remaining: Duration,
    /// Towers still defended by the player.
    pub player_towers: u32,
    /// Towers still defended by the opponent.
    pub enemy_towers: u32,
}

/// Persisted battle progression: trophies, collection and deck.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Trophies held by the player.
    pub trophies: u32,
    /// Arena stored alongside the trophies; recomputed on load.
    pub arena_level: u32,
    /// Every card collected by the player.
    pub cards: Vec<Card>,
    /// Configured deck in slot order.
    pub deck: Vec<CardId>,
}
