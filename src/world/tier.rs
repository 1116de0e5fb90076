//! Region tiers: worker capacity, garrison thresholds and production rates.

use serde::{Deserialize, Serialize};

use super::Amount;

/// The number of tier slots.
pub const TIER_COUNT: usize = 5;

/// The highest tier a region can reach.
pub const MAX_TIER: u8 = (TIER_COUNT - 1) as u8;

/// One slot of the tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionTier {
    /// Upper bound on the sum of worker stakes in a region of this tier.
    pub worker_capacity: Amount,
    /// Garrison a region needs to hold this tier; exceeding it on a deploy
    /// advances to the next tier.
    pub required_garrison: Amount,
    /// Pleb produced per second, split among the region's workers.
    pub production_per_sec: Amount,
}

impl RegionTier {
    pub const fn new(worker_capacity: Amount, required_garrison: Amount, production_per_sec: Amount) -> Self {
        RegionTier {
            worker_capacity,
            required_garrison,
            production_per_sec,
        }
    }
}

/// Fixed five-slot lookup indexed by tier level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable(pub [RegionTier; TIER_COUNT]);

impl Default for TierTable {
    fn default() -> Self {
        TierTable([
            RegionTier::new(1_500, 0, 1_000),
            RegionTier::new(3_000, 1_000, 2_000),
            RegionTier::new(5_000, 2_000, 4_000),
            RegionTier::new(10_000, 3_000, 8_000),
            RegionTier::new(15_000, 4_000, 16_000),
        ])
    }
}

impl TierTable {
    /// Returns the slot for `tier`, clamped to the top slot.
    pub fn get(&self, tier: u8) -> &RegionTier {
        &self.0[usize::from(tier.min(MAX_TIER))]
    }

    /// Tier after a garrison deploy: one step up once `garrison` exceeds the
    /// current tier's threshold.
    pub fn advance(&self, tier: u8, garrison: Amount) -> u8 {
        if tier < MAX_TIER && garrison > self.get(tier).required_garrison {
            tier + 1
        } else {
            tier
        }
    }

    /// Highest tier at or below `tier` that `garrison` can hold.
    pub fn demote(&self, mut tier: u8, garrison: Amount) -> u8 {
        while tier > 0 && garrison < self.get(tier).required_garrison {
            tier -= 1;
        }
        tier
    }
}
