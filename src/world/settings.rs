//! Process-wide game settings.
//!
//! Unlike the region graph and tier table, settings stay owner-mutable for
//! the whole life of the game.

use serde::{Deserialize, Serialize};

use super::{Amount, Timestamp};

pub const HOUR: Timestamp = 3_600;
pub const DAY: Timestamp = 24 * HOUR;

/// Pleb minted to a player on every join.
pub const STARTING_PLEB: Amount = 1_000;

/// Tunable rules of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Payment required by `join_game`.
    pub ticket_price: Amount,
    /// Minimum age of a siege before it can resolve at all.
    pub rally_time: Timestamp,
    /// Age after which a non-overwhelming siege resolves.
    pub siege_time: Timestamp,
    /// Protection granted to a defender after a won siege.
    pub siege_cooldown: Timestamp,
    /// Stake ratio at which one side wins instantly after rally time.
    pub overwhelm_ratio: Amount,
    /// Owner's cut of every claim, in percent.
    pub owner_fee_percent: u8,
    /// Largest referrer cut a claimant may request, in percent.
    pub max_frontend_fee_percent: u8,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            ticket_price: 10 * 10u128.pow(18),
            rally_time: 8 * HOUR,
            siege_time: DAY,
            siege_cooldown: 4 * DAY,
            overwhelm_ratio: 3,
            owner_fee_percent: 2,
            max_frontend_fee_percent: 2,
        }
    }
}

impl GameSettings {
    /// Checks internal consistency. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if u16::from(self.owner_fee_percent) + u16::from(self.max_frontend_fee_percent) > 100 {
            return Err(format!(
                "owner fee {}% plus max frontend fee {}% exceeds 100%",
                self.owner_fee_percent, self.max_frontend_fee_percent
            ));
        }
        if self.overwhelm_ratio == 0 {
            return Err("overwhelm ratio must be at least 1".to_string());
        }
        Ok(())
    }

    /// Returns a copy with the field called `name` set from `value`.
    ///
    /// Names match the serialized field names.
    pub fn with_field(&self, name: &str, value: &str) -> Result<GameSettings, String> {
        let mut next = *self;
        let bad = |_| format!("invalid value '{}' for {}", value, name);
        match name {
            "ticket_price" => next.ticket_price = value.parse().map_err(bad)?,
            "rally_time" => next.rally_time = value.parse().map_err(bad)?,
            "siege_time" => next.siege_time = value.parse().map_err(bad)?,
            "siege_cooldown" => next.siege_cooldown = value.parse().map_err(bad)?,
            "overwhelm_ratio" => next.overwhelm_ratio = value.parse().map_err(bad)?,
            "owner_fee_percent" => next.owner_fee_percent = value.parse().map_err(bad)?,
            "max_frontend_fee_percent" => {
                next.max_frontend_fee_percent = value.parse().map_err(bad)?
            }
            other => return Err(format!("unknown setting '{}'", other)),
        }
        Ok(next)
    }
}
