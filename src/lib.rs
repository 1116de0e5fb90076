//! PhantomRisk engine library.
//!
//! A territorial-conquest economy: factions stake a fungible resource into
//! regions as workers, garrison or attacking soldiers. Workers earn
//! continuous production, sieges resolve lazily whenever a besieged region
//! is touched, and every entry point is atomic.
//!
//! Exposes the world model, production accounting, siege resolution, the
//! game entry points and the protocol modules for use by integration tests
//! and the binaries.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod game;
pub mod invariants;
pub mod production;
pub mod protocol;
pub mod resolve;
pub mod simulate;
pub mod token;
pub mod world;
