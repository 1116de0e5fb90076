//! Externally callable entry points.
//!
//! Every mutating call runs inside [`Game::transact`]: the world, the token
//! ledger and the event log are restored if the call returns an error, so a
//! rejected call leaves no trace, not even the lazy siege resolutions it
//! performed before failing. Every call that names a region first settles
//! any siege on it that has become resolvable.

use crate::error::{GameError, GameResult};
use crate::events::Event;
use crate::production::{percent_of, LordStake};
use crate::resolve::{siege_outcome, try_settle, Resolution, SiegeOutcome};
use crate::token::{PlebBank, Token};
use crate::world::{
    Address, Amount, Faction, GameSettings, Region, RegionId, RegionSpec, RegionTier, Siege,
    Timestamp, World, MAX_TIER, STARTING_PLEB, TIER_COUNT,
};

/// Net result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub gross: Amount,
    pub owner_fee: Amount,
    pub frontend_fee: Amount,
    pub net: Amount,
}

/// A world plus the token it stakes, and the log of emitted events.
#[derive(Debug, Clone)]
pub struct Game<T: Token = PlebBank> {
    world: World,
    token: T,
    events: Vec<Event>,
}

impl Game<PlebBank> {
    /// Creates an empty game backed by an in-memory token ledger.
    pub fn new(owner: Address) -> Self {
        Game::with_token(World::new(owner), PlebBank::default())
    }
}

impl<T: Token> Game<T> {
    pub fn with_token(world: World, token: T) -> Self {
        Game {
            world,
            token,
            events: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns all emitted events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Runs `f` atomically: on error every mutation it made is discarded.
    fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> GameResult<R>) -> GameResult<R> {
        let world = self.world.clone();
        let token = self.token.clone();
        let emitted = self.events.len();
        match f(self) {
            Ok(r) => Ok(r),
            Err(e) => {
                self.world = world;
                self.token = token;
                self.events.truncate(emitted);
                tracing::debug!(error = %e, "call rejected, state rolled back");
                Err(e)
            }
        }
    }

    /// Lazily resolves the siege on `id`, recording the event if one fired.
    fn settle(&mut self, id: RegionId, now: Timestamp) -> GameResult<Option<Resolution>> {
        let resolution = try_settle(&mut self.world, id, now)?;
        if let Some(r) = resolution {
            self.events.push(Event::ResolvedSiege(r));
        }
        Ok(resolution)
    }

    fn faction_of(&self, player: &Address) -> GameResult<Faction> {
        self.world
            .factions
            .faction_of(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))
    }

    fn burn(&mut self, from: &Address, amount: Amount) -> GameResult<()> {
        self.token
            .burn(from, amount)
            .map_err(|e| GameError::InsufficientStake {
                required: e.requested,
                available: e.available,
            })
    }

    fn ensure_balance(&self, holder: &Address, amount: Amount) -> GameResult<()> {
        let available = self.token.balance_of(holder);
        if available < amount {
            return Err(GameError::InsufficientStake {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    // ---- setup (owner only, before the deployment lock) ----

    /// Bulk-creates regions and credits each to its controlling faction.
    pub fn create_regions(&mut self, caller: &Address, specs: Vec<RegionSpec>) -> GameResult<()> {
        self.transact(|g| {
            g.world.ensure_owner(caller)?;
            g.world.ensure_setup_open()?;
            for spec in specs {
                if spec.tier > MAX_TIER {
                    return Err(GameError::InvalidSetup(format!(
                        "region {} has tier {} above {}",
                        spec.id, spec.tier, MAX_TIER
                    )));
                }
                let capacity = g.world.tiers.get(spec.tier).worker_capacity;
                if spec.total_worker > capacity {
                    return Err(GameError::InvalidSetup(format!(
                        "region {} starts with {} workers over capacity {}",
                        spec.id, spec.total_worker, capacity
                    )));
                }
                let faction = spec.controlled_by;
                let id = spec.id;
                if !g.world.graph.insert(Region::from(spec)) {
                    return Err(GameError::InvalidSetup(format!("duplicate region {}", id)));
                }
                g.world.factions.add_region(faction);
            }
            tracing::debug!(regions = g.world.graph.len(), "regions created");
            Ok(())
        })
    }

    /// Replaces all five tier definitions.
    pub fn set_region_tiers(&mut self, caller: &Address, tiers: [RegionTier; TIER_COUNT]) -> GameResult<()> {
        self.transact(|g| {
            g.world.ensure_owner(caller)?;
            g.world.ensure_setup_open()?;
            g.world.tiers.0 = tiers;
            Ok(())
        })
    }

    /// Permanently freezes the region graph and tier table.
    pub fn set_deployment_done(&mut self, caller: &Address) -> GameResult<()> {
        self.transact(|g| {
            g.world.ensure_owner(caller)?;
            g.world.ensure_setup_open()?;
            g.world.deployment_done = true;
            g.events.push(Event::DeploymentDone);
            tracing::info!(regions = g.world.graph.len(), "deployment done");
            Ok(())
        })
    }

    /// Replaces the game settings. Allowed at any time.
    pub fn set_settings(&mut self, caller: &Address, settings: GameSettings) -> GameResult<()> {
        self.transact(|g| {
            g.world.ensure_owner(caller)?;
            settings.validate().map_err(GameError::InvalidSettings)?;
            let old = std::mem::replace(&mut g.world.settings, settings);
            g.events.push(Event::SettingsChanged { old, new: settings });
            Ok(())
        })
    }

    // ---- player actions ----

    /// Assigns the caller a faction and mints the starting stake.
    pub fn join_game(&mut self, caller: &Address, payment: Amount) -> GameResult<Faction> {
        self.transact(|g| {
            let required = g.world.settings.ticket_price;
            if payment < required {
                return Err(GameError::InsufficientPayment { required, paid: payment });
            }
            let faction = g
                .world
                .factions
                .assign(caller)
                .ok_or(GameError::NoLivingFaction)?;
            g.token.mint(caller, STARTING_PLEB);
            g.events.push(Event::JoinedGame {
                player: caller.clone(),
                faction,
            });
            tracing::debug!(player = %caller, %faction, "joined game");
            Ok(faction)
        })
    }

    /// Stakes `amount` as workers in one of the caller's peaceful regions.
    pub fn deploy_worker(
        &mut self,
        caller: &Address,
        region: RegionId,
        amount: Amount,
        now: Timestamp,
    ) -> GameResult<()> {
        self.transact(|g| {
            g.settle(region, now)?;
            if amount == 0 {
                return Err(GameError::ZeroAmount);
            }
            let faction = g.faction_of(caller)?;
            let r = g.world.region(region)?;
            if !r.is_secure_for(faction) {
                return Err(GameError::RegionNotSecure(region));
            }
            g.ensure_balance(caller, amount)?;
            let capacity = g.world.tiers.get(r.tier).worker_capacity;
            if r.total_worker.saturating_add(amount) > capacity {
                return Err(GameError::TierTooLow(region));
            }

            g.world.settle_production(region, now)?;
            g.burn(caller, amount)?;
            g.world.production.add_worker(region, caller, amount, now);
            g.world.region_mut(region)?.total_worker += amount;
            g.events.push(Event::DeployedWorker {
                player: caller.clone(),
                region,
                amount,
            });
            tracing::debug!(player = %caller, %region, %amount, "deployed worker");
            Ok(())
        })
    }

    /// Stakes `amount` as garrison in `region_to`, sent from `region_from`.
    ///
    /// `region_from` must be the caller's and peaceful; `region_to` must be
    /// the same region or a neighbor and may belong to any faction. The
    /// target's tier rises as far as its new garrison allows.
    pub fn deploy_garrison(
        &mut self,
        caller: &Address,
        region_to: RegionId,
        region_from: RegionId,
        amount: Amount,
        now: Timestamp,
    ) -> GameResult<()> {
        self.transact(|g| {
            g.settle(region_to, now)?;
            if region_from != region_to {
                g.settle(region_from, now)?;
            }
            if amount == 0 {
                return Err(GameError::ZeroAmount);
            }
            let faction = g.faction_of(caller)?;
            g.world.region(region_to)?;
            if !g.world.region(region_from)?.is_secure_for(faction) {
                return Err(GameError::RegionNotSecure(region_from));
            }
            if region_from != region_to && !g.world.graph.is_neighbor(region_from, region_to) {
                return Err(GameError::MovementNotAllowed {
                    from: region_from,
                    to: region_to,
                });
            }
            g.ensure_balance(caller, amount)?;

            g.world.settle_production(region_to, now)?;
            g.burn(caller, amount)?;
            g.world.production.add_garrison(region_to, caller, amount, now);
            let tiers = g.world.tiers;
            let r = g.world.region_mut(region_to)?;
            r.garrison += amount;
            let tier = tiers.advance(r.tier, r.garrison);
            if tier != r.tier {
                tracing::debug!(region = %region_to, from = r.tier, to = tier, "tier advanced");
                r.tier = tier;
            }
            g.events.push(Event::DeployedGarrison {
                player: caller.clone(),
                region: region_to,
                amount,
            });
            Ok(())
        })
    }

    /// Burns `soldiers` into a siege on `region_to`, launched from `region_from`.
    ///
    /// An existing siege is reinforced: soldiers accumulate, the originally
    /// recorded attacker is kept, and the siege clock restarts.
    pub fn attack(
        &mut self,
        caller: &Address,
        region_to: RegionId,
        region_from: RegionId,
        soldiers: Amount,
        now: Timestamp,
    ) -> GameResult<()> {
        self.transact(|g| {
            g.settle(region_to, now)?;
            if region_from != region_to {
                g.settle(region_from, now)?;
            }
            if soldiers == 0 {
                return Err(GameError::ZeroAmount);
            }
            let faction = g.faction_of(caller)?;
            g.world.region(region_to)?;
            g.world.region(region_from)?;
            if !g.world.graph.allows_attack(region_from, region_to, faction, now) {
                return Err(GameError::MovementNotAllowed {
                    from: region_from,
                    to: region_to,
                });
            }
            g.burn(caller, soldiers)?;

            let target = g.world.region_mut(region_to)?;
            target.siege = Some(match target.siege {
                Some(existing) => Siege {
                    attacker: existing.attacker,
                    attacked_at: now,
                    soldier: existing.soldier.saturating_add(soldiers),
                },
                None => Siege {
                    attacker: faction,
                    attacked_at: now,
                    soldier: soldiers,
                },
            });
            g.events.push(Event::Attacked {
                player: caller.clone(),
                faction,
                region: region_to,
                soldiers,
            });
            tracing::debug!(player = %caller, %faction, region = %region_to, %soldiers, "attacked");
            Ok(())
        })
    }

    /// Crystallizes the caller's production in `region`.
    ///
    /// The owner fee and the requested frontend fee are floored percentages
    /// of the gross amount, credited to the fee ledger; the rest is minted
    /// to `recipient` (the caller when `None`).
    pub fn claim_pleb(
        &mut self,
        caller: &Address,
        region: RegionId,
        frontend_fee_percent: u8,
        frontend: &Address,
        recipient: Option<&Address>,
        now: Timestamp,
    ) -> GameResult<Claim> {
        self.transact(|g| {
            let max = g.world.settings.max_frontend_fee_percent;
            if frontend_fee_percent > max {
                return Err(GameError::FeeTooHigh {
                    requested: frontend_fee_percent,
                    max,
                });
            }
            g.settle(region, now)?;
            if g.world.region(region)?.besieged() {
                return Err(GameError::RegionNotAtPeace(region));
            }

            g.world.settle_production(region, now)?;
            let gross = g.world.production.take_accrued(region, caller);
            if gross == 0 {
                return Err(GameError::NothingToClaim(region));
            }
            let owner_fee = percent_of(gross, g.world.settings.owner_fee_percent);
            let frontend_fee = percent_of(gross, frontend_fee_percent);
            let net = gross - owner_fee - frontend_fee;

            let owner = g.world.owner.clone();
            g.world.fees.credit(&owner, owner_fee);
            g.world.fees.credit(frontend, frontend_fee);
            g.token.mint(recipient.unwrap_or(caller), net);
            g.events.push(Event::ClaimedPleb {
                player: caller.clone(),
                amount: net,
            });
            tracing::debug!(player = %caller, %region, %gross, %net, "claimed pleb");
            Ok(Claim {
                gross,
                owner_fee,
                frontend_fee,
                net,
            })
        })
    }

    /// Mints every fee accrued to the caller.
    pub fn claim_fees(&mut self, caller: &Address) -> GameResult<Amount> {
        self.transact(|g| {
            let amount = g.world.fees.take(caller);
            if amount == 0 {
                return Err(GameError::NoFeesAccrued(caller.clone()));
            }
            g.token.mint(caller, amount);
            g.events.push(Event::ClaimedFees {
                recipient: caller.clone(),
                amount,
            });
            Ok(amount)
        })
    }

    /// Resolves the siege on `region` if it is resolvable. Anyone may call this.
    pub fn resolve_siege(&mut self, region: RegionId, now: Timestamp) -> GameResult<Option<Resolution>> {
        self.transact(|g| g.settle(region, now))
    }

    // ---- queries ----

    pub fn siege_outcome(&self, region: RegionId, now: Timestamp) -> GameResult<SiegeOutcome> {
        let r = self.world.region(region)?;
        Ok(siege_outcome(r, &self.world.settings, now))
    }

    pub fn is_neighbor(&self, a: RegionId, b: RegionId) -> bool {
        self.world.graph.is_neighbor(a, b)
    }

    /// Whether `player` could attack `to` from `from` at `now`, ignoring balance.
    pub fn region_allows_attack(&self, player: &Address, from: RegionId, to: RegionId, now: Timestamp) -> bool {
        self.world
            .factions
            .faction_of(player)
            .is_some_and(|f| self.world.graph.allows_attack(from, to, f, now))
    }

    pub fn claimable_pleb(&self, region: RegionId, lord: &Address, now: Timestamp) -> GameResult<Amount> {
        self.world.claimable_pleb(region, lord, now)
    }

    pub fn production_by_lord(&self, region: RegionId, lord: &Address) -> Option<LordStake> {
        self.world.production.stake(region, lord).copied()
    }

    pub fn claimable_fees(&self, recipient: &Address) -> Amount {
        self.world.fees.balance(recipient)
    }

    pub fn regions_per_faction(&self, faction: Faction) -> u32 {
        self.world.factions.regions_of(faction)
    }

    pub fn faction_dead(&self, faction: Faction) -> bool {
        self.world.factions.is_dead(faction)
    }

    pub fn player_faction(&self, player: &Address) -> Option<Faction> {
        self.world.factions.faction_of(player)
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.token.balance_of(holder)
    }
}
