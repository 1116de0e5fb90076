//! JSON scenario files: a tier table and a region list for bulk setup.
//!
//! ```json
//! {
//!   "regions": [
//!     { "id": 0, "controlled_by": "red", "garrison": 50, "neighbors": [1, 3] },
//!     { "id": 1, "controlled_by": "blue", "garrison": 50, "neighbors": [0] }
//!   ],
//!   "lock": true
//! }
//! ```
//!
//! `tiers` may be omitted to keep the default table.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GameError;
use crate::game::Game;
use crate::token::Token;
use crate::world::{Address, RegionSpec, TierTable};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scenario rejected: {0}")]
    Rejected(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub tiers: Option<TierTable>,
    pub regions: Vec<RegionSpec>,
    /// Set the deployment lock once the regions are in place.
    #[serde(default)]
    pub lock: bool,
}

impl Scenario {
    pub fn from_json(contents: &str) -> Result<Scenario, ScenarioError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Scenario, ScenarioError> {
        let contents = fs::read_to_string(path)?;
        Scenario::from_json(&contents)
    }

    /// Runs the setup calls this scenario describes, as `owner`.
    ///
    /// Each call is atomic on its own; a rejection stops at that call.
    pub fn apply<T: Token>(self, game: &mut Game<T>, owner: &Address) -> Result<(), ScenarioError> {
        let count = self.regions.len();
        if let Some(tiers) = self.tiers {
            game.set_region_tiers(owner, tiers.0)?;
        }
        game.create_regions(owner, self.regions)?;
        if self.lock {
            game.set_deployment_done(owner)?;
        }
        tracing::info!(regions = count, locked = self.lock, "scenario applied");
        Ok(())
    }
}
