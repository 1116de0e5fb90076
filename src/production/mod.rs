//! Production accounting.
//!
//! Tracks time-weighted worker shares per region and the fees skimmed off
//! every claim.

pub mod fees;
pub mod ledger;

pub use fees::{percent_of, FeeLedger};
pub use ledger::{accrual, LordStake, ProductionLedger};
