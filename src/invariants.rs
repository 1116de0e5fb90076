//! World invariants: sanity checks that detect bookkeeping bugs.
//!
//! None of these can trigger through the public entry points. The
//! simulator and the property tests run them after every call.

use crate::world::{World, ALL_FACTIONS, FACTION_COUNT, MAX_TIER};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Checks every world invariant. Returns an empty list if all hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    let mut controlled = [0u32; FACTION_COUNT];
    for region in world.graph.iter() {
        controlled[region.controlled_by as usize] += 1;

        if region.tier > MAX_TIER {
            report(format!("region {} has tier {} > {}", region.id, region.tier, MAX_TIER));
        }

        let capacity = world.tiers.get(region.tier).worker_capacity;
        if region.total_worker > capacity {
            report(format!(
                "region {} holds {} workers over tier capacity {}",
                region.id, region.total_worker, capacity
            ));
        }

        let staked = world.production.staked_workers(region.id);
        if staked > region.total_worker {
            report(format!(
                "region {} lords stake {} workers but the pool is {}",
                region.id, staked, region.total_worker
            ));
        }

        if let Some(siege) = region.siege {
            if siege.soldier == 0 {
                report(format!("region {} carries an empty siege", region.id));
            }
            if siege.attacker == region.controlled_by {
                report(format!(
                    "region {} is besieged by its own faction {}",
                    region.id, siege.attacker
                ));
            }
        }
    }

    for faction in ALL_FACTIONS {
        let counted = world.factions.regions_of(faction);
        if counted != controlled[faction as usize] {
            report(format!(
                "{} is credited {} regions but controls {}",
                faction, counted, controlled[faction as usize]
            ));
        }
    }

    violations
}
