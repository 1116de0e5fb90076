//! The `World` aggregate.
//!
//! One explicit arena owning every region, stake, faction aggregate and
//! fee balance. All game operations take it by reference; there is no
//! ambient global state.

use crate::error::{GameError, GameResult};
use crate::production::{FeeLedger, ProductionLedger};

use super::faction::FactionRegistry;
use super::graph::RegionGraph;
use super::region::{Region, RegionId};
use super::settings::GameSettings;
use super::tier::TierTable;
use super::{Address, Amount, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    /// Address allowed to run setup and change settings. Also receives the owner fee.
    pub owner: Address,
    pub settings: GameSettings,
    pub tiers: TierTable,
    pub graph: RegionGraph,
    pub factions: FactionRegistry,
    pub production: ProductionLedger,
    pub fees: FeeLedger,
    /// Once set, the graph and tier table are frozen.
    pub deployment_done: bool,
}

impl World {
    /// Creates an empty world with default settings and tiers.
    pub fn new(owner: Address) -> Self {
        World::with_settings(owner, GameSettings::default())
    }

    pub fn with_settings(owner: Address, settings: GameSettings) -> Self {
        World {
            owner,
            settings,
            tiers: TierTable::default(),
            graph: RegionGraph::default(),
            factions: FactionRegistry::default(),
            production: ProductionLedger::default(),
            fees: FeeLedger::default(),
            deployment_done: false,
        }
    }

    pub fn region(&self, id: RegionId) -> GameResult<&Region> {
        self.graph.get(id).ok_or(GameError::UnknownRegion(id))
    }

    pub fn region_mut(&mut self, id: RegionId) -> GameResult<&mut Region> {
        self.graph.get_mut(id).ok_or(GameError::UnknownRegion(id))
    }

    /// Current production rate of a region.
    pub fn rate_of(&self, region: &Region) -> Amount {
        self.tiers.get(region.tier).production_per_sec
    }

    /// Settles every lord of `id` up to `now` at the region's current rate and pool.
    ///
    /// Must run before anything changes the region's tier or worker pool.
    pub fn settle_production(&mut self, id: RegionId, now: Timestamp) -> GameResult<()> {
        let region = self.region(id)?;
        let rate = self.rate_of(region);
        let total = region.total_worker;
        self.production.settle(id, rate, total, now);
        Ok(())
    }

    /// Production `lord` could claim from `id` at `now`, before fees.
    pub fn claimable_pleb(&self, id: RegionId, lord: &Address, now: Timestamp) -> GameResult<Amount> {
        let region = self.region(id)?;
        Ok(self
            .production
            .pending(id, lord, self.rate_of(region), region.total_worker, now))
    }

    /// Rejects unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> GameResult<()> {
        if *caller != self.owner {
            return Err(GameError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    /// Rejects once the deployment lock has been set.
    pub fn ensure_setup_open(&self) -> GameResult<()> {
        if self.deployment_done {
            return Err(GameError::SetupLocked);
        }
        Ok(())
    }
}
