//! Hand rotation: eight active slots refilled from a shuffled draw queue.

use std::collections::{BTreeSet, VecDeque};

use farm_royale_core::{BattleError, CardId, RandomSource, HAND_SIZE};

/// Configured deck together with the live hand and its draw queue.
#[derive(Clone, Debug)]
pub(crate) struct Deck {
    lineup: Vec<CardId>,
    hand: Vec<CardId>,
    queue: VecDeque<CardId>,
}

impl Deck {
    /// Builds a deck from exactly [`HAND_SIZE`] distinct known cards and shuffles it.
    pub(crate) fn build<F>(
        cards: &[CardId],
        is_known: F,
        random: &mut dyn RandomSource,
    ) -> Result<Self, BattleError>
    where
        F: Fn(CardId) -> bool,
    {
        if cards.len() != HAND_SIZE {
            return Err(BattleError::InvalidDeckSize);
        }

        let distinct: BTreeSet<CardId> = cards.iter().copied().collect();
        if distinct.len() != HAND_SIZE || !cards.iter().all(|card| is_known(*card)) {
            return Err(BattleError::InvalidDeckSize);
        }

        Ok(Self::from_lineup(cards.to_vec(), random))
    }

    /// Builds a deck from a lineup already known to be valid.
    pub(crate) fn from_lineup(lineup: Vec<CardId>, random: &mut dyn RandomSource) -> Self {
        let mut deck = Self {
            hand: lineup.clone(),
            lineup,
            queue: VecDeque::with_capacity(HAND_SIZE),
        };
        deck.shuffle(random);
        deck
    }

    /// Restores the hand to the configured lineup and reshuffles the queue.
    pub(crate) fn reset(&mut self, random: &mut dyn RandomSource) {
        self.hand.clone_from(&self.lineup);
        self.shuffle(random);
    }

    /// Loads a uniformly random permutation of the current hand into the queue.
    pub(crate) fn shuffle(&mut self, random: &mut dyn RandomSource) {
        let mut shuffled = self.hand.clone();
        shuffle_in_place(&mut shuffled, random);
        self.queue.clear();
        self.queue.extend(shuffled);
    }

    /// Pops the next queued card, reshuffling the hand first when the queue ran dry.
    pub(crate) fn draw_replacement(
        &mut self,
        random: &mut dyn RandomSource,
    ) -> Result<CardId, BattleError> {
        if self.queue.is_empty() {
            self.shuffle(random);
        }
        self.queue.pop_front().ok_or(BattleError::InvalidDeckSize)
    }

    /// Card currently held in a slot.
    pub(crate) fn card_at(&self, slot: usize) -> Result<CardId, BattleError> {
        self.hand
            .get(slot)
            .copied()
            .ok_or(BattleError::InvalidSlot { slot })
    }

    /// Replaces the card in `slot`, returning the played card and its replacement.
    pub(crate) fn play(
        &mut self,
        slot: usize,
        random: &mut dyn RandomSource,
    ) -> Result<(CardId, CardId), BattleError> {
        let played = self.card_at(slot)?;
        let replacement = self.draw_replacement(random)?;
        self.hand[slot] = replacement;
        Ok((played, replacement))
    }

    pub(crate) fn lineup(&self) -> &[CardId] {
        &self.lineup
    }

    pub(crate) fn hand(&self) -> &[CardId] {
        &self.hand
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Fisher–Yates shuffle driven by uniform integer draws.
pub(crate) fn shuffle_in_place<T>(items: &mut [T], random: &mut dyn RandomSource) {
    let len = items.len();
    if len < 2 {
        return;
    }

    let last = u32::try_from(len - 1).unwrap_or(u32::MAX);
    for index in 0..last {
        let swap = random.random_int(index, last) as usize;
        items.swap(index as usize, swap);
    }
}
