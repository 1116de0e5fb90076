//! The region graph: all regions keyed by id, plus adjacency queries.
//!
//! Neighbor lists are stored exactly as supplied at setup. Two regions are
//! neighbors if either one lists the other; the lists are never rewritten
//! to be symmetric.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::region::{Region, RegionId};
use super::Timestamp;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionGraph {
    regions: BTreeMap<RegionId, Region>,
}

impl RegionGraph {
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(&id)
    }

    /// Inserts a region. Returns false (and leaves the graph unchanged) if
    /// the id is already taken.
    pub fn insert(&mut self, region: Region) -> bool {
        if self.regions.contains_key(&region.id) {
            return false;
        }
        self.regions.insert(region.id, region);
        true
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterates regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// All region ids in ascending order.
    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }

    /// Returns true if `a` lists `b` or `b` lists `a`.
    pub fn is_neighbor(&self, a: RegionId, b: RegionId) -> bool {
        let forward = self.get(a).is_some_and(|r| r.lists_neighbor(b));
        let backward = self.get(b).is_some_and(|r| r.lists_neighbor(a));
        forward || backward
    }

    /// Checks whether `faction` may launch an attack from `from` onto `to`.
    ///
    /// `from` must be an unbesieged neighbor controlled by `faction`, `to`
    /// must be held by someone else, and `to` must be out of cooldown.
    pub fn allows_attack(&self, from: RegionId, to: RegionId, faction: Faction, now: Timestamp) -> bool {
        let (Some(src), Some(dst)) = (self.get(from), self.get(to)) else {
            return false;
        };
        self.is_neighbor(from, to)
            && src.controlled_by == faction
            && !src.besieged()
            && dst.controlled_by != faction
            && now >= dst.cant_get_attacked_till
    }
}
