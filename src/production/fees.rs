//! Accrued protocol and referrer fees awaiting withdrawal.

use std::collections::HashMap;

use crate::world::{Address, Amount};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeLedger {
    balances: HashMap<Address, Amount>,
}

impl FeeLedger {
    pub fn balance(&self, recipient: &Address) -> Amount {
        self.balances.get(recipient).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, recipient: &Address, amount: Amount) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(recipient.clone()).or_default() += amount;
    }

    /// Removes and returns everything owed to `recipient`.
    pub fn take(&mut self, recipient: &Address) -> Amount {
        self.balances.remove(recipient).unwrap_or(0)
    }
}

/// `percent` of `amount`, rounded down.
pub fn percent_of(amount: Amount, percent: u8) -> Amount {
    amount.saturating_mul(Amount::from(percent)) / 100
}
