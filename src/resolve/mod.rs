//! Siege resolution.
//!
//! Evaluates and applies siege outcomes lazily, as a side effect of any call
//! that touches a besieged region.

pub mod siege;

pub use siege::{siege_outcome, try_settle, Resolution, SiegeOutcome};
