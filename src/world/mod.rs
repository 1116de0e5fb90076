//! World representation.
//!
//! Contains the region graph, tier table, faction registry, settings and
//! the `World` aggregate that owns all of them.

pub mod faction;
pub mod graph;
pub mod region;
pub mod settings;
pub mod state;
pub mod tier;

use serde::{Deserialize, Serialize};

pub use faction::{Faction, FactionRegistry, ALL_FACTIONS, FACTION_COUNT};
pub use graph::RegionGraph;
pub use region::{Position, Region, RegionId, RegionSpec, Siege};
pub use settings::{GameSettings, DAY, HOUR, STARTING_PLEB};
pub use state::World;
pub use tier::{RegionTier, TierTable, MAX_TIER, TIER_COUNT};

/// Quantity of the staking resource.
pub type Amount = u128;

/// Host-supplied wall-clock time in seconds. Never rewinds.
pub type Timestamp = u64;

/// Identifies a player, the owner, or a fee recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Address(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
