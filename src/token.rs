//! The fungible staking resource ("pleb").
//!
//! The game only needs mint, burn and balance queries. Stakes are burned on
//! deploy/attack and production is minted on claim, so the game never holds
//! a token balance of its own.

use std::collections::HashMap;

use thiserror::Error;

use crate::world::{Address, Amount};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{holder} holds {available}, cannot burn {requested}")]
pub struct BurnError {
    pub holder: Address,
    pub requested: Amount,
    pub available: Amount,
}

/// Token operations the game is allowed to perform.
///
/// Implementations must be `Clone` so a failed call can be rolled back.
pub trait Token: Clone {
    fn balance_of(&self, holder: &Address) -> Amount;

    fn mint(&mut self, to: &Address, amount: Amount);

    fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), BurnError>;

    fn total_supply(&self) -> Amount;
}

/// In-memory token ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlebBank {
    balances: HashMap<Address, Amount>,
    supply: Amount,
}

impl Token for PlebBank {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn mint(&mut self, to: &Address, amount: Amount) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(to.clone()).or_default() += amount;
        self.supply += amount;
    }

    fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), BurnError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(BurnError {
                holder: from.clone(),
                requested: amount,
                available,
            });
        }
        if amount > 0 {
            self.balances.insert(from.clone(), available - amount);
            self.supply -= amount;
        }
        Ok(())
    }

    fn total_supply(&self) -> Amount {
        self.supply
    }
}
