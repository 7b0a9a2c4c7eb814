//! Player resource balances.

use std::collections::BTreeMap;

use farm_royale_core::ResourceType;
use serde::{Deserialize, Serialize};

const STARTING_COINS: u64 = 100;
const STARTING_GEMS: u64 = 5;

/// Store of every resource the player holds.
pub trait ResourceLedger {
    /// Current balance of `resource`.
    fn amount(&self, resource: ResourceType) -> u64;

    /// Credits `amount` units of `resource`.
    fn add(&mut self, resource: ResourceType, amount: u64);

    /// Debits `amount` units when the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    fn spend(&mut self, resource: ResourceType, amount: u64) -> bool;
}

/// In-memory ledger seeded with the starting coins and gems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balances: BTreeMap<ResourceType, u64>,
}

impl Wallet {
    /// Creates a wallet holding 100 coins and 5 gems.
    #[must_use]
    pub fn new() -> Self {
        Self::with_currency(STARTING_COINS, STARTING_GEMS)
    }

    /// Creates a wallet holding the provided currency and nothing else.
    #[must_use]
    pub fn with_currency(coins: u64, gems: u64) -> Self {
        let mut balances = BTreeMap::new();
        let _ = balances.insert(ResourceType::Coins, coins);
        let _ = balances.insert(ResourceType::Gems, gems);
        Self { balances }
    }

    /// Non-zero balances in resource order.
    pub fn balances(&self) -> impl Iterator<Item = (ResourceType, u64)> + '_ {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(resource, amount)| (*resource, *amount))
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLedger for Wallet {
    fn amount(&self, resource: ResourceType) -> u64 {
        self.balances.get(&resource).copied().unwrap_or(0)
    }

    fn add(&mut self, resource: ResourceType, amount: u64) {
        let balance = self.balances.entry(resource).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    fn spend(&mut self, resource: ResourceType, amount: u64) -> bool {
        match self.balances.get_mut(&resource) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => amount == 0,
        }
    }
}
