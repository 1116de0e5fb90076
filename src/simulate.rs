//! Randomized self-play over many worlds.
//!
//! Each simulated world gets a grid map, a handful of players, and a long
//! sequence of random calls with random clock advances. After every call the
//! harness checks the world invariants, and after every rejected call it
//! checks that the world was left exactly as it was. Worlds are independent
//! and run in parallel on a rayon pool.

use std::io::Write;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::GameError;
use crate::game::Game;
use crate::invariants::check_invariants;
use crate::world::{
    Address, Amount, Faction, RegionId, RegionSpec, Timestamp, ALL_FACTIONS, FACTION_COUNT, HOUR,
};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of independent worlds.
    pub worlds: usize,
    /// Players joined into each world.
    pub players: usize,
    /// Random calls made per world.
    pub steps: usize,
    /// Upper bound of the clock advance between calls, in seconds.
    pub max_step_seconds: Timestamp,
    /// Grid side length; the map has `grid * grid` regions.
    pub grid: u32,
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            worlds: 8,
            players: 12,
            steps: 2_000,
            max_step_seconds: 2 * HOUR,
            grid: 4,
            threads: 4,
            seed: 0,
        }
    }
}

/// Outcome of one simulated world.
#[derive(Debug, Clone, Serialize)]
pub struct SimRecord {
    pub world_id: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub resolutions: usize,
    pub conquests: usize,
    pub eliminated: Vec<Faction>,
    pub final_regions: [u32; FACTION_COUNT],
    pub final_time: Timestamp,
    pub violations: Vec<String>,
}

/// Builds a `side` x `side` grid split into four faction quadrants.
///
/// Each region lists only its right and lower neighbor, so adjacency is
/// recorded on one side only.
pub fn grid_map(side: u32) -> Vec<RegionSpec> {
    let half = side.div_ceil(2);
    let mut specs = Vec::with_capacity((side * side) as usize);
    for y in 0..side {
        for x in 0..side {
            let quadrant = usize::from(x >= half) + 2 * usize::from(y >= half);
            let mut neighbors = Vec::new();
            if x + 1 < side {
                neighbors.push(RegionId(y * side + x + 1));
            }
            if y + 1 < side {
                neighbors.push(RegionId((y + 1) * side + x));
            }
            specs.push(RegionSpec {
                id: RegionId(y * side + x),
                position: crate::world::Position {
                    x: x as i32,
                    y: y as i32,
                },
                tier: 0,
                garrison: 50,
                neighbors,
                controlled_by: ALL_FACTIONS[quadrant % FACTION_COUNT],
                total_worker: 0,
            });
        }
    }
    specs
}

/// Random amount in `1..=cap`, biased toward small stakes.
fn stake(rng: &mut SmallRng, cap: Amount) -> Amount {
    if cap == 0 {
        return rng.gen_range(1..=10);
    }
    let bound = if rng.gen_bool(0.7) { cap.min(200) } else { cap };
    rng.gen_range(1..=bound.max(1))
}

/// Simulates one world from its own seed.
pub fn simulate_world(config: &SimConfig, world_id: usize, rng: &mut SmallRng) -> SimRecord {
    let owner = Address::from("owner");
    let mut game = Game::new(owner.clone());
    let mut record = SimRecord {
        world_id,
        accepted: 0,
        rejected: 0,
        resolutions: 0,
        conquests: 0,
        eliminated: Vec::new(),
        final_regions: [0; FACTION_COUNT],
        final_time: 0,
        violations: Vec::new(),
    };

    let setup = game
        .create_regions(&owner, grid_map(config.grid))
        .and_then(|()| game.set_deployment_done(&owner));
    if let Err(e) = setup {
        record.violations.push(format!("setup failed: {}", e));
        return record;
    }

    let price = game.world().settings.ticket_price;
    let players: Vec<Address> = (0..config.players.max(1))
        .map(|i| Address::from(format!("p{}", i)))
        .collect();
    for p in &players {
        if let Err(e) = game.join_game(p, price) {
            record.violations.push(format!("join failed: {}", e));
        }
    }

    let ids = game.world().graph.ids();
    if ids.is_empty() {
        record.violations.push("grid has no regions".to_string());
        return record;
    }
    let mut now: Timestamp = 0;

    for step in 0..config.steps {
        now += rng.gen_range(0..=config.max_step_seconds);
        let player = &players[rng.gen_range(0..players.len())];
        let region = ids[rng.gen_range(0..ids.len())];
        let other = ids[rng.gen_range(0..ids.len())];
        let balance = game.balance_of(player);

        let before = game.world().clone();
        let events_before = game.events().len();
        let result: Result<(), GameError> = match rng.gen_range(0..100) {
            0..=19 => game.deploy_worker(player, region, stake(rng, balance), now),
            20..=34 => game.deploy_garrison(player, region, other, stake(rng, balance), now),
            35..=59 => game.attack(player, region, other, stake(rng, balance), now),
            60..=84 => {
                let fee = rng.gen_range(0..=3);
                let frontend = &players[rng.gen_range(0..players.len())];
                game.claim_pleb(player, region, fee, frontend, None, now).map(|_| ())
            }
            85..=94 => game.resolve_siege(region, now).map(|_| ()),
            95..=97 => game.claim_fees(player).map(|_| ()),
            _ => game.join_game(player, price).map(|_| ()),
        };

        match result {
            Ok(()) => record.accepted += 1,
            Err(e) => {
                record.rejected += 1;
                if game.world() != &before || game.events().len() != events_before {
                    record
                        .violations
                        .push(format!("step {}: rejected call ({}) left changes", step, e.kind()));
                }
            }
        }

        for event in game.drain_events() {
            if let crate::events::Event::ResolvedSiege(r) = event {
                record.resolutions += 1;
                if r.winner != before.region(r.region).map_or(r.winner, |reg| reg.controlled_by) {
                    record.conquests += 1;
                }
                if r.eliminated {
                    record.eliminated.push(r.loser);
                }
            }
        }

        for v in check_invariants(game.world()) {
            record.violations.push(format!("step {}: {}", step, v.message));
        }
    }

    for f in ALL_FACTIONS {
        record.final_regions[f as usize] = game.regions_per_faction(f);
    }
    record.final_time = now;
    record
}

fn world_rng(seed: u64, world_id: usize) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed.wrapping_add(world_id as u64))
    }
}

/// Runs every world of `config` on a rayon pool, returned in world order.
pub fn run_simulation(config: &SimConfig) -> Result<Vec<SimRecord>, rayon::ThreadPoolBuildError> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.max(1))
        .build()?;

    let start = Instant::now();
    let records: Vec<SimRecord> = pool.install(|| {
        (0..config.worlds)
            .into_par_iter()
            .map(|id| {
                let mut rng = world_rng(config.seed, id);
                let record = simulate_world(config, id, &mut rng);
                tracing::debug!(
                    world = id,
                    accepted = record.accepted,
                    resolutions = record.resolutions,
                    "world finished"
                );
                record
            })
            .collect()
    });
    tracing::info!(
        worlds = records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "simulation finished"
    );
    Ok(records)
}

/// Writes one JSON object per record.
pub fn write_jsonl<W: Write>(records: &[SimRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints aggregate statistics to stderr.
pub fn print_summary(records: &[SimRecord]) {
    let calls: usize = records.iter().map(|r| r.accepted + r.rejected).sum();
    let accepted: usize = records.iter().map(|r| r.accepted).sum();
    let resolutions: usize = records.iter().map(|r| r.resolutions).sum();
    let conquests: usize = records.iter().map(|r| r.conquests).sum();
    let violations: usize = records.iter().map(|r| r.violations.len()).sum();
    let mut eliminations = [0usize; FACTION_COUNT];
    for r in records {
        for f in &r.eliminated {
            eliminations[*f as usize] += 1;
        }
    }

    eprintln!("=== Simulation Summary ===");
    eprintln!("Worlds: {}", records.len());
    eprintln!(
        "Calls: {} ({} accepted, {} rejected)",
        calls,
        accepted,
        calls - accepted
    );
    eprintln!("Sieges resolved: {} ({} conquests)", resolutions, conquests);
    for f in ALL_FACTIONS {
        eprintln!("  {:<7} eliminated in {} worlds", f.name(), eliminations[f as usize]);
    }
    eprintln!("Invariant violations: {}", violations);
}
