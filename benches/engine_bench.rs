use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use phantom_risk::game::Game;
use phantom_risk::invariants::check_invariants;
use phantom_risk::production::ProductionLedger;
use phantom_risk::resolve::{siege_outcome, try_settle};
use phantom_risk::simulate::{grid_map, simulate_world, SimConfig};
use phantom_risk::world::{Address, Faction, RegionId, Siege, DAY, HOUR};

/// A locked 8x8 grid with 16 joined players.
fn grid_game() -> Game {
    let owner = Address::from("owner");
    let mut g = Game::new(owner.clone());
    g.create_regions(&owner, grid_map(8)).unwrap();
    g.set_deployment_done(&owner).unwrap();
    let price = g.world().settings.ticket_price;
    for i in 0..16 {
        g.join_game(&Address::from(format!("p{}", i)), price).unwrap();
    }
    g.drain_events();
    g
}

fn bench_siege_outcome(c: &mut Criterion) {
    let g = grid_game();
    let mut region = g.world().region(RegionId(0)).unwrap().clone();
    region.siege = Some(Siege {
        attacker: Faction::Blue,
        attacked_at: 0,
        soldier: 51,
    });
    let settings = g.world().settings;
    c.bench_function("siege_outcome_attrition", |b| {
        b.iter(|| siege_outcome(black_box(&region), black_box(&settings), black_box(2 * DAY)))
    });
}

fn bench_try_settle_conquest(c: &mut Criterion) {
    let mut g = grid_game();
    // p1 is blue; region 4 is blue and borders red region 3.
    g.attack(&Address::from("p1"), RegionId(3), RegionId(4), 150, 0)
        .unwrap();
    let world = g.world().clone();
    c.bench_function("try_settle_conquest", |b| {
        b.iter_batched(
            || world.clone(),
            |mut w| try_settle(&mut w, black_box(RegionId(3)), 8 * HOUR),
            BatchSize::SmallInput,
        )
    });
}

fn bench_settle_many_lords(c: &mut Criterion) {
    let mut ledger = ProductionLedger::default();
    for i in 0..256 {
        ledger.add_worker(RegionId(0), &Address::from(format!("lord{}", i)), 10, i);
    }
    c.bench_function("settle_256_lords", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut l| l.settle(RegionId(0), black_box(16_000), 2_560, black_box(DAY)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_deploy_worker(c: &mut Criterion) {
    let g = grid_game();
    c.bench_function("deploy_worker_with_rollback_snapshot", |b| {
        b.iter_batched(
            || g.clone(),
            |mut g| g.deploy_worker(&Address::from("p0"), RegionId(0), 100, 10),
            BatchSize::SmallInput,
        )
    });
}

fn bench_check_invariants(c: &mut Criterion) {
    let g = grid_game();
    c.bench_function("check_invariants_64_regions", |b| {
        b.iter(|| check_invariants(black_box(g.world())))
    });
}

fn bench_simulate_world(c: &mut Criterion) {
    let config = SimConfig {
        steps: 1_000,
        ..SimConfig::default()
    };
    let mut group = c.benchmark_group("simulate");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("one_world_1000_steps", |b| {
        b.iter(|| simulate_world(&config, 0, &mut SmallRng::seed_from_u64(7)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_siege_outcome,
    bench_try_settle_conquest,
    bench_settle_many_lords,
    bench_deploy_worker,
    bench_check_invariants,
    bench_simulate_world
);
criterion_main!(benches);
