//! Regions and sieges.
//!
//! A region is a node of the world graph. It is owned by exactly one faction,
//! holds a garrison and a worker pool, and carries at most one active siege.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::{Amount, Timestamp};

/// Identifies a region. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque map position. Identity only; it has no gameplay effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// An in-progress attack on a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Siege {
    /// Faction recorded when the siege was opened.
    pub attacker: Faction,
    /// Time of the latest attack contributing to this siege.
    pub attacked_at: Timestamp,
    /// Accumulated attacking stake. Always non-zero.
    pub soldier: Amount,
}

/// Complete mutable state of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub position: Position,
    pub tier: u8,
    pub garrison: Amount,
    pub total_worker: Amount,
    pub controlled_by: Faction,
    pub cant_get_attacked_till: Timestamp,
    pub siege: Option<Siege>,
    pub neighbors: BTreeSet<RegionId>,
}

impl Region {
    /// Returns true while a siege is active.
    pub fn besieged(&self) -> bool {
        self.siege.is_some_and(|s| s.soldier > 0)
    }

    /// Returns true if `other` appears in this region's own neighbor list.
    pub fn lists_neighbor(&self, other: RegionId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Returns true if `faction` controls this region and it is not besieged.
    pub fn is_secure_for(&self, faction: Faction) -> bool {
        self.controlled_by == faction && !self.besieged()
    }
}

/// Setup input for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub id: RegionId,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub tier: u8,
    #[serde(default)]
    pub garrison: Amount,
    #[serde(default)]
    pub neighbors: Vec<RegionId>,
    pub controlled_by: Faction,
    #[serde(default)]
    pub total_worker: Amount,
}

impl From<RegionSpec> for Region {
    fn from(spec: RegionSpec) -> Self {
        Region {
            id: spec.id,
            position: spec.position,
            tier: spec.tier,
            garrison: spec.garrison,
            total_worker: spec.total_worker,
            controlled_by: spec.controlled_by,
            cant_get_attacked_till: 0,
            siege: None,
            neighbors: spec.neighbors.into_iter().collect(),
        }
    }
}
