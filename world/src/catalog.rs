//! Card collection owned by the player.

use std::collections::BTreeMap;

use farm_royale_core::{BattleError, Card, CardId, CardKind, CardStats, RandomSource, HAND_SIZE};

const STARTER_CARD_COUNT: u32 = 12;
const STARTER_MIN_COST: u32 = 1;
const STARTER_MAX_COST: u32 = 5;

/// Registry of every card the player has collected, keyed by identifier.
#[derive(Clone, Debug, Default)]
pub(crate) struct Catalog {
    cards: BTreeMap<CardId, Card>,
}

impl Catalog {
    /// Builds a catalog from previously collected cards.
    ///
    /// Later duplicates of an identifier are merged into the first entry.
    pub(crate) fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut catalog = Self::default();
        for card in cards {
            let _ = catalog.register(card);
        }
        catalog
    }

    /// Creates the twelve starter cards handed to new players.
    ///
    /// Costs are rolled from the provided source.
    pub(crate) fn starter(random: &mut dyn RandomSource) -> Self {
        let cards = (0..STARTER_CARD_COUNT).map(|index| {
            let kind = match index {
                0..=3 => CardKind::Troop,
                4..=7 => CardKind::Spell,
                _ => CardKind::Building,
            };
            let cost = random.random_int(STARTER_MIN_COST, STARTER_MAX_COST);
            Card::new(
                CardId::new(index),
                format!("Starter Card {index}"),
                cost,
                kind,
                starter_stats(kind),
            )
        });
        Self::from_cards(cards)
    }

    /// Adds missing starter cards until the collection can fill a deck.
    ///
    /// Returns the number of cards added.
    pub(crate) fn top_up_with_starters(&mut self, random: &mut dyn RandomSource) -> usize {
        if self.cards.len() >= HAND_SIZE {
            return 0;
        }

        let mut added = 0;
        for card in Self::starter(random).cards.into_values() {
            if self.cards.len() >= HAND_SIZE {
                break;
            }
            if !self.contains(card.id()) {
                let _ = self.register(card);
                added += 1;
            }
        }
        added
    }

    pub(crate) fn get(&self, id: CardId) -> Result<&Card, BattleError> {
        self.cards.get(&id).ok_or(BattleError::UnknownCard(id))
    }

    pub(crate) fn get_mut(&mut self, id: CardId) -> Result<&mut Card, BattleError> {
        self.cards.get_mut(&id).ok_or(BattleError::UnknownCard(id))
    }

    pub(crate) fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Adds a card, merging its copies into an existing entry with the same id.
    pub(crate) fn register(&mut self, card: Card) -> CardId {
        let id = card.id();
        if let Some(existing) = self.cards.get_mut(&id) {
            existing.add_copies(card.owned());
        } else {
            let _ = self.cards.insert(id, card);
        }
        id
    }

    /// Iterator over every card in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Lowest identifiers of the collection, used when no valid deck is configured.
    ///
    /// Holds [`HAND_SIZE`] distinct known cards once the catalog was topped up.
    pub(crate) fn default_lineup(&self) -> Vec<CardId> {
        self.cards.keys().copied().take(HAND_SIZE).collect()
    }
}

fn starter_stats(kind: CardKind) -> CardStats {
    match kind {
        CardKind::Troop | CardKind::FarmAnimal => CardStats {
            damage: 75,
            health: 400,
            attack_speed: 1.2,
            range: 1.0,
            movement_speed: 1.0,
            ..CardStats::default()
        },
        CardKind::Spell => CardStats {
            damage: 200,
            splash: true,
            splash_radius: 2.5,
            ..CardStats::default()
        },
        CardKind::Building => CardStats {
            damage: 50,
            health: 800,
            attack_speed: 1.0,
            range: 5.0,
            ..CardStats::default()
        },
    }
}
