//! Observable events emitted by successful calls, for external indexers.

use serde::{Deserialize, Serialize};

use crate::resolve::Resolution;
use crate::world::{Address, Amount, Faction, GameSettings, RegionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    JoinedGame {
        player: Address,
        faction: Faction,
    },
    DeployedWorker {
        player: Address,
        region: RegionId,
        amount: Amount,
    },
    DeployedGarrison {
        player: Address,
        region: RegionId,
        amount: Amount,
    },
    Attacked {
        player: Address,
        faction: Faction,
        region: RegionId,
        soldiers: Amount,
    },
    ResolvedSiege(Resolution),
    ClaimedPleb {
        player: Address,
        amount: Amount,
    },
    ClaimedFees {
        recipient: Address,
        amount: Amount,
    },
    SettingsChanged {
        old: GameSettings,
        new: GameSettings,
    },
    DeploymentDone,
}

impl Event {
    /// Short name matching the serialized tag.
    pub const fn name(&self) -> &'static str {
        match self {
            Event::JoinedGame { .. } => "joined_game",
            Event::DeployedWorker { .. } => "deployed_worker",
            Event::DeployedGarrison { .. } => "deployed_garrison",
            Event::Attacked { .. } => "attacked",
            Event::ResolvedSiege(_) => "resolved_siege",
            Event::ClaimedPleb { .. } => "claimed_pleb",
            Event::ClaimedFees { .. } => "claimed_fees",
            Event::SettingsChanged { .. } => "settings_changed",
            Event::DeploymentDone => "deployment_done",
        }
    }
}
