//! Siege combat resolution.
//!
//! Sieges are never scheduled. Any call touching a region first asks
//! [`try_settle`] whether the region's siege has become resolvable at `now`
//! and, if so, applies the result before doing its own work.
//!
//! Combat is a pure function of the two stakes and the siege's age:
//! - younger than `rally_time`: the siege stands;
//! - once rallied, a side holding `overwhelm_ratio` times the other's stake
//!   wins at once and loses only half the opposing stake;
//! - otherwise, after `siege_time`, the larger stake wins (ties defend) and
//!   keeps the difference.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::world::{Amount, Faction, GameSettings, Region, RegionId, Timestamp, World};

/// Result of evaluating a siege at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiegeOutcome {
    pub resolvable: bool,
    pub defender_wins: bool,
    pub remaining_garrison: Amount,
    pub overwhelm: bool,
}

/// An applied siege resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub region: RegionId,
    pub winner: Faction,
    pub loser: Faction,
    pub remaining_garrison: Amount,
    /// Attacking stake the siege had accumulated.
    pub soldier: Amount,
    pub overwhelm: bool,
    /// Set when the loser has no regions left.
    pub eliminated: bool,
}

/// Evaluates the siege on `region` at `now` without changing anything.
pub fn siege_outcome(region: &Region, settings: &GameSettings, now: Timestamp) -> SiegeOutcome {
    let Some(siege) = region.siege.filter(|s| s.soldier > 0) else {
        return SiegeOutcome::default();
    };
    let age = now.saturating_sub(siege.attacked_at);
    if age < settings.rally_time {
        return SiegeOutcome::default();
    }

    let garrison = region.garrison;
    let soldier = siege.soldier;
    let ratio = settings.overwhelm_ratio;

    if soldier >= ratio.saturating_mul(garrison) {
        return SiegeOutcome {
            resolvable: true,
            defender_wins: false,
            remaining_garrison: soldier.saturating_sub(garrison / 2),
            overwhelm: true,
        };
    }
    if garrison >= ratio.saturating_mul(soldier) {
        return SiegeOutcome {
            resolvable: true,
            defender_wins: true,
            remaining_garrison: garrison.saturating_sub(soldier / 2),
            overwhelm: true,
        };
    }

    if age < settings.siege_time {
        return SiegeOutcome::default();
    }
    let defender_wins = garrison >= soldier;
    SiegeOutcome {
        resolvable: true,
        defender_wins,
        remaining_garrison: garrison.abs_diff(soldier),
        overwhelm: false,
    }
}

/// Resolves the siege on `id` if it is resolvable at `now`.
///
/// Returns `Ok(None)` without touching anything when there is no siege or it
/// still stands.
pub fn try_settle(world: &mut World, id: RegionId, now: Timestamp) -> GameResult<Option<Resolution>> {
    let region = world.region(id)?;
    let Some(siege) = region.siege else {
        return Ok(None);
    };
    let outcome = siege_outcome(region, &world.settings, now);
    if !outcome.resolvable {
        return Ok(None);
    }
    let defender = region.controlled_by;

    // Price production up to now at the pre-battle tier and pool.
    world.settle_production(id, now)?;

    let tiers = world.tiers;
    let cooldown = world.settings.siege_cooldown;
    let region = world.region_mut(id)?;
    region.siege = None;
    region.garrison = outcome.remaining_garrison;

    let resolution = if outcome.defender_wins {
        region.cant_get_attacked_till = now.saturating_add(cooldown);
        let tier = tiers.demote(region.tier, region.garrison);
        let old_total = region.total_worker;
        if tier != region.tier {
            tracing::debug!(region = %id, from = region.tier, to = tier, "tier demoted");
            region.tier = tier;
            region.total_worker = old_total.min(tiers.get(tier).worker_capacity);
        }
        let new_total = region.total_worker;
        world.production.scale_workers(id, old_total, new_total);
        Resolution {
            region: id,
            winner: defender,
            loser: siege.attacker,
            remaining_garrison: outcome.remaining_garrison,
            soldier: siege.soldier,
            overwhelm: outcome.overwhelm,
            eliminated: false,
        }
    } else {
        region.controlled_by = siege.attacker;
        region.tier = 0;
        region.total_worker = 0;
        world.production.wipe(id);
        let eliminated = world.factions.transfer_region(defender, siege.attacker);
        if eliminated {
            tracing::info!(faction = %defender, "faction eliminated");
        }
        Resolution {
            region: id,
            winner: siege.attacker,
            loser: defender,
            remaining_garrison: outcome.remaining_garrison,
            soldier: siege.soldier,
            overwhelm: outcome.overwhelm,
            eliminated,
        }
    };

    tracing::info!(
        region = %id,
        winner = %resolution.winner,
        loser = %resolution.loser,
        remaining = %resolution.remaining_garrison,
        overwhelm = resolution.overwhelm,
        "siege resolved"
    );
    Ok(Some(resolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Address, RegionSpec, Siege, DAY, HOUR};

    fn region(garrison: Amount, soldier: Amount) -> Region {
        let mut r = Region::from(RegionSpec {
            id: RegionId(3),
            position: Default::default(),
            tier: 0,
            garrison,
            neighbors: vec![RegionId(0)],
            controlled_by: Faction::Blue,
            total_worker: 0,
        });
        r.siege = Some(Siege {
            attacker: Faction::Red,
            attacked_at: 0,
            soldier,
        });
        r
    }

    fn outcome(garrison: Amount, soldier: Amount, age: Timestamp) -> (bool, bool, Amount) {
        let o = siege_outcome(&region(garrison, soldier), &GameSettings::default(), age);
        (o.resolvable, o.defender_wins, o.remaining_garrison)
    }

    #[test]
    fn stands_before_rally_time() {
        assert_eq!(outcome(50, 10_000, 8 * HOUR - 1), (false, false, 0));
    }

    #[test]
    fn attacker_overwhelms_after_rally() {
        assert_eq!(outcome(50, 150, 9 * HOUR), (true, false, 125));
    }

    #[test]
    fn defender_overwhelms_after_rally() {
        assert_eq!(outcome(300, 100, 9 * HOUR), (true, true, 250));
    }

    #[test]
    fn no_overwhelm_waits_for_siege_time() {
        assert_eq!(outcome(50, 51, 9 * HOUR), (false, false, 0));
    }

    #[test]
    fn attrition_attacker_wins_with_more() {
        assert_eq!(outcome(50, 51, 3 * DAY), (true, false, 1));
    }

    #[test]
    fn attrition_defender_wins_with_more() {
        assert_eq!(outcome(50, 49, 2 * DAY), (true, true, 1));
    }

    #[test]
    fn attrition_tie_defends() {
        assert_eq!(outcome(50, 50, 2 * DAY), (true, true, 0));
    }

    #[test]
    fn empty_garrison_is_overwhelmed() {
        assert_eq!(outcome(0, 1, 8 * HOUR), (true, false, 1));
    }

    #[test]
    fn no_siege_is_not_resolvable() {
        let mut r = region(50, 1);
        r.siege = None;
        assert_eq!(
            siege_outcome(&r, &GameSettings::default(), 10 * DAY),
            SiegeOutcome::default()
        );
    }

    fn world_with(garrison: Amount, soldier: Amount) -> World {
        let mut w = World::new(Address::from("owner"));
        w.graph.insert(region(garrison, soldier));
        w.factions.add_region(Faction::Blue);
        w
    }

    #[test]
    fn try_settle_is_noop_while_siege_stands() {
        let mut w = world_with(50, 51);
        let before = w.clone();
        assert_eq!(try_settle(&mut w, RegionId(3), HOUR).unwrap(), None);
        assert_eq!(w, before);
    }

    #[test]
    fn try_settle_conquest_flips_control_and_kills() {
        let mut w = world_with(50, 51);
        let res = try_settle(&mut w, RegionId(3), 3 * DAY).unwrap().unwrap();
        assert_eq!(res.winner, Faction::Red);
        assert_eq!(res.loser, Faction::Blue);
        assert!(res.eliminated);
        let r = w.region(RegionId(3)).unwrap();
        assert_eq!(r.controlled_by, Faction::Red);
        assert_eq!(r.garrison, 1);
        assert_eq!(r.cant_get_attacked_till, 0);
        assert!(!r.besieged());
        assert!(w.factions.is_dead(Faction::Blue));
        assert_eq!(w.factions.regions_of(Faction::Red), 1);
    }

    #[test]
    fn try_settle_defence_sets_cooldown() {
        let mut w = world_with(50, 49);
        let res = try_settle(&mut w, RegionId(3), 2 * DAY).unwrap().unwrap();
        assert_eq!(res.winner, Faction::Blue);
        assert!(!res.overwhelm);
        let r = w.region(RegionId(3)).unwrap();
        assert_eq!(r.cant_get_attacked_till, 2 * DAY + 4 * DAY);
        assert_eq!(r.controlled_by, Faction::Blue);
    }

    #[test]
    fn second_settle_is_noop() {
        let mut w = world_with(50, 49);
        assert!(try_settle(&mut w, RegionId(3), 2 * DAY).unwrap().is_some());
        let after = w.clone();
        assert_eq!(try_settle(&mut w, RegionId(3), 2 * DAY).unwrap(), None);
        assert_eq!(w, after);
    }
}
