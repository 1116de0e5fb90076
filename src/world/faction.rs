//! The four factions and the registry that tracks their territory.
//!
//! Factions are a closed set; per-faction aggregates are stored in
//! fixed-size arrays indexed by `Faction as usize`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Address;

/// The number of factions in the game.
pub const FACTION_COUNT: usize = 4;

/// One of the four teams a player can belong to.
///
/// The `#[repr(u8)]` attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Faction {
    Red = 0,
    Blue = 1,
    Green = 2,
    Yellow = 3,
}

/// All factions in join order.
pub const ALL_FACTIONS: [Faction; FACTION_COUNT] =
    [Faction::Red, Faction::Blue, Faction::Green, Faction::Yellow];

impl Faction {
    /// Returns the lowercase name of this faction.
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Red => "red",
            Faction::Blue => "blue",
            Faction::Green => "green",
            Faction::Yellow => "yellow",
        }
    }

    /// Parses a faction from its lowercase name.
    pub fn from_name(name: &str) -> Option<Faction> {
        match name {
            "red" => Some(Faction::Red),
            "blue" => Some(Faction::Blue),
            "green" => Some(Faction::Green),
            "yellow" => Some(Faction::Yellow),
            _ => None,
        }
    }

    /// Returns the faction that follows this one in round-robin order.
    pub const fn next(self) -> Faction {
        ALL_FACTIONS[(self as usize + 1) % FACTION_COUNT]
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Faction membership and territory bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactionRegistry {
    /// Controlled-region count per faction.
    regions: [u32; FACTION_COUNT],
    /// Set once a faction loses its last region.
    dead: [bool; FACTION_COUNT],
    /// Faction handed to the next joining player (before dead-skipping).
    next_join: Faction,
    players: HashMap<Address, Faction>,
}

impl Default for FactionRegistry {
    fn default() -> Self {
        FactionRegistry {
            regions: [0; FACTION_COUNT],
            dead: [false; FACTION_COUNT],
            next_join: Faction::Red,
            players: HashMap::new(),
        }
    }
}

impl FactionRegistry {
    /// Number of regions currently controlled by `faction`.
    pub fn regions_of(&self, faction: Faction) -> u32 {
        self.regions[faction as usize]
    }

    /// Returns true once `faction` has been eliminated.
    pub fn is_dead(&self, faction: Faction) -> bool {
        self.dead[faction as usize]
    }

    /// The faction `player` most recently joined, if any.
    pub fn faction_of(&self, player: &Address) -> Option<Faction> {
        self.players.get(player).copied()
    }

    /// Number of distinct players that have joined.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Assigns `player` the next living faction in round-robin order.
    ///
    /// A previous assignment is overwritten. Returns `None` when every
    /// faction is dead.
    pub fn assign(&mut self, player: &Address) -> Option<Faction> {
        for _ in 0..FACTION_COUNT {
            let candidate = self.next_join;
            self.next_join = candidate.next();
            if !self.is_dead(candidate) {
                self.players.insert(player.clone(), candidate);
                return Some(candidate);
            }
        }
        None
    }

    /// Records a newly created region for `faction`.
    pub fn add_region(&mut self, faction: Faction) {
        self.regions[faction as usize] += 1;
    }

    /// Moves one region from `loser` to `winner`.
    ///
    /// Returns true if this eliminated `loser`.
    pub fn transfer_region(&mut self, loser: Faction, winner: Faction) -> bool {
        let count = &mut self.regions[loser as usize];
        *count = count.saturating_sub(1);
        self.regions[winner as usize] += 1;
        if self.regions[loser as usize] == 0 && !self.dead[loser as usize] {
            self.dead[loser as usize] = true;
            return true;
        }
        false
    }

    /// Marks `faction` dead regardless of its territory.
    pub fn kill(&mut self, faction: Faction) {
        self.dead[faction as usize] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    #[test]
    fn faction_name_roundtrip() {
        for f in ALL_FACTIONS {
            assert_eq!(Faction::from_name(f.name()), Some(f));
        }
        assert_eq!(Faction::from_name("purple"), None);
    }

    #[test]
    fn next_wraps_around() {
        assert_eq!(Faction::Red.next(), Faction::Blue);
        assert_eq!(Faction::Yellow.next(), Faction::Red);
    }

    #[test]
    fn assign_is_round_robin() {
        let mut reg = FactionRegistry::default();
        let got: Vec<Faction> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|p| reg.assign(&addr(p)).unwrap())
            .collect();
        assert_eq!(
            got,
            vec![Faction::Red, Faction::Blue, Faction::Green, Faction::Yellow, Faction::Red]
        );
    }

    #[test]
    fn assign_skips_dead_factions() {
        let mut reg = FactionRegistry::default();
        reg.kill(Faction::Red);
        assert_eq!(reg.assign(&addr("a")), Some(Faction::Blue));
        assert_eq!(reg.assign(&addr("b")), Some(Faction::Green));
        assert_eq!(reg.assign(&addr("c")), Some(Faction::Yellow));
        assert_eq!(reg.assign(&addr("d")), Some(Faction::Blue));
    }

    #[test]
    fn rejoin_overwrites_assignment() {
        let mut reg = FactionRegistry::default();
        reg.assign(&addr("a"));
        assert_eq!(reg.assign(&addr("a")), Some(Faction::Blue));
        assert_eq!(reg.faction_of(&addr("a")), Some(Faction::Blue));
        assert_eq!(reg.player_count(), 1);
    }

    #[test]
    fn assign_fails_when_all_dead() {
        let mut reg = FactionRegistry::default();
        for f in ALL_FACTIONS {
            reg.kill(f);
        }
        assert_eq!(reg.assign(&addr("a")), None);
    }

    #[test]
    fn losing_last_region_kills() {
        let mut reg = FactionRegistry::default();
        reg.add_region(Faction::Blue);
        reg.add_region(Faction::Red);
        assert!(reg.transfer_region(Faction::Blue, Faction::Red));
        assert_eq!(reg.regions_of(Faction::Red), 2);
        assert_eq!(reg.regions_of(Faction::Blue), 0);
        assert!(reg.is_dead(Faction::Blue));
        assert!(!reg.is_dead(Faction::Red));
    }
}
