//! Rejection reasons for game calls.
//!
//! Every variant is terminal: the call is rolled back in full and the caller
//! must fix the precondition before resubmitting.

use thiserror::Error;

use crate::world::{Address, Amount, RegionId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("ticket costs {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    #[error("balance {available} is below the requested {required}")]
    InsufficientStake { required: Amount, available: Amount },

    #[error("region {0} must be yours and peaceful")]
    RegionNotSecure(RegionId),

    #[error("region {0} must be at peace")]
    RegionNotAtPeace(RegionId),

    #[error("regions {from} -> {to} do not allow movement")]
    MovementNotAllowed { from: RegionId, to: RegionId },

    #[error("region {0} needs a higher tier for that many workers")]
    TierTooLow(RegionId),

    #[error("frontend fee {requested}% exceeds the maximum {max}%")]
    FeeTooHigh { requested: u8, max: u8 },

    #[error("nothing to claim in region {0}")]
    NothingToClaim(RegionId),

    #[error("no fees accrued for {0}")]
    NoFeesAccrued(Address),

    #[error("{0} is not the owner")]
    Unauthorized(Address),

    #[error("deployment already done")]
    SetupLocked,

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("{0} has not joined the game")]
    UnknownPlayer(Address),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("every faction has been eliminated")]
    NoLivingFaction,

    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl GameError {
    /// Stable short name used by the text protocol.
    pub const fn kind(&self) -> &'static str {
        match self {
            GameError::InsufficientPayment { .. } => "insufficient_payment",
            GameError::InsufficientStake { .. } => "insufficient_stake",
            GameError::RegionNotSecure(_) => "region_not_secure",
            GameError::RegionNotAtPeace(_) => "region_not_at_peace",
            GameError::MovementNotAllowed { .. } => "movement_not_allowed",
            GameError::TierTooLow(_) => "tier_too_low",
            GameError::FeeTooHigh { .. } => "fee_too_high",
            GameError::NothingToClaim(_) => "nothing_to_claim",
            GameError::NoFeesAccrued(_) => "no_fees_accrued",
            GameError::Unauthorized(_) => "unauthorized",
            GameError::SetupLocked => "setup_locked",
            GameError::UnknownRegion(_) => "unknown_region",
            GameError::UnknownPlayer(_) => "unknown_player",
            GameError::ZeroAmount => "zero_amount",
            GameError::NoLivingFaction => "no_living_faction",
            GameError::InvalidSetup(_) => "invalid_setup",
            GameError::InvalidSettings(_) => "invalid_settings",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
