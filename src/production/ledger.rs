//! Per-region, per-lord stake and production bookkeeping.
//!
//! Production accrues continuously between settlements. A settlement prices
//! every staked lord of a region from their `last_claimed_at` up to now with
//! the rate and worker pool passed by the caller, which must be the values in
//! effect *before* the change that triggered the settlement. Each term is
//! `floor(elapsed * rate * stake / total_worker)`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::world::{Address, Amount, RegionId, Timestamp};

/// One lord's position in one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LordStake {
    pub worker_stake: Amount,
    pub garrison_stake: Amount,
    /// Settled but unclaimed production.
    pub accrued: Amount,
    pub last_claimed_at: Timestamp,
}

/// Production owed for `elapsed` seconds at `rate` to a `stake` share of `total`.
pub fn accrual(elapsed: Timestamp, rate: Amount, stake: Amount, total: Amount) -> Amount {
    if total == 0 || stake == 0 || elapsed == 0 {
        return 0;
    }
    let numerator = u128::from(elapsed).saturating_mul(rate).saturating_mul(stake);
    numerator / total
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionLedger {
    regions: HashMap<RegionId, BTreeMap<Address, LordStake>>,
}

impl ProductionLedger {
    /// Returns the lord's stake record, if one was ever created.
    pub fn stake(&self, region: RegionId, lord: &Address) -> Option<&LordStake> {
        self.regions.get(&region).and_then(|lords| lords.get(lord))
    }

    /// Lords with a record in `region`, in address order.
    pub fn lords(&self, region: RegionId) -> impl Iterator<Item = (&Address, &LordStake)> {
        self.regions.get(&region).into_iter().flat_map(|lords| lords.iter())
    }

    /// Sum of all per-lord worker stakes in `region`.
    pub fn staked_workers(&self, region: RegionId) -> Amount {
        self.lords(region).map(|(_, s)| s.worker_stake).sum()
    }

    /// Settles every lord of `region` up to `now`.
    pub fn settle(&mut self, region: RegionId, rate: Amount, total_worker: Amount, now: Timestamp) {
        let Some(lords) = self.regions.get_mut(&region) else {
            return;
        };
        for stake in lords.values_mut() {
            let elapsed = now.saturating_sub(stake.last_claimed_at);
            stake.accrued = stake
                .accrued
                .saturating_add(accrual(elapsed, rate, stake.worker_stake, total_worker));
            stake.last_claimed_at = now;
        }
    }

    /// Settled plus not-yet-settled production of `lord` as of `now`.
    pub fn pending(
        &self,
        region: RegionId,
        lord: &Address,
        rate: Amount,
        total_worker: Amount,
        now: Timestamp,
    ) -> Amount {
        let Some(stake) = self.stake(region, lord) else {
            return 0;
        };
        let elapsed = now.saturating_sub(stake.last_claimed_at);
        stake
            .accrued
            .saturating_add(accrual(elapsed, rate, stake.worker_stake, total_worker))
    }

    fn entry(&mut self, region: RegionId, lord: &Address, now: Timestamp) -> &mut LordStake {
        self.regions
            .entry(region)
            .or_default()
            .entry(lord.clone())
            .or_insert(LordStake {
                last_claimed_at: now,
                ..LordStake::default()
            })
    }

    /// Adds worker stake. The region must have been settled at `now` first.
    pub fn add_worker(&mut self, region: RegionId, lord: &Address, amount: Amount, now: Timestamp) {
        let stake = self.entry(region, lord, now);
        stake.worker_stake += amount;
        stake.last_claimed_at = now;
    }

    /// Adds garrison stake. The region must have been settled at `now` first.
    pub fn add_garrison(&mut self, region: RegionId, lord: &Address, amount: Amount, now: Timestamp) {
        let stake = self.entry(region, lord, now);
        stake.garrison_stake += amount;
        stake.last_claimed_at = now;
    }

    /// Removes and returns the lord's settled production.
    pub fn take_accrued(&mut self, region: RegionId, lord: &Address) -> Amount {
        self.regions
            .get_mut(&region)
            .and_then(|lords| lords.get_mut(lord))
            .map(|s| std::mem::take(&mut s.accrued))
            .unwrap_or(0)
    }

    /// Drops every stake in `region`, including unclaimed production.
    pub fn wipe(&mut self, region: RegionId) {
        self.regions.remove(&region);
    }

    /// Scales every worker stake in `region` by `new_total / old_total`, rounding down.
    pub fn scale_workers(&mut self, region: RegionId, old_total: Amount, new_total: Amount) {
        if old_total == 0 || new_total >= old_total {
            return;
        }
        let Some(lords) = self.regions.get_mut(&region) else {
            return;
        };
        for stake in lords.values_mut() {
            stake.worker_stake = stake.worker_stake.saturating_mul(new_total) / old_total;
        }
    }
}
