use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nbody_live::{
    BodyCreator, EngineConfig, IntegrationEngine, RandomBodyCreator, SimulationState,
    SpawnConfig, TimeStep,
};
use rand::{rngs::StdRng, SeedableRng};

fn setup(n_bodies: usize) -> IntegrationEngine {
    let mut creator =
        RandomBodyCreator::with_rng(&SpawnConfig::default(), StdRng::seed_from_u64(0));
    let state = Arc::new(SimulationState::new(n_bodies).unwrap());
    for body in creator.create_bodies(n_bodies).unwrap() {
        state.append(&body);
    }

    let config = EngineConfig::default();
    IntegrationEngine::new(state, TimeStep::new(config.time_step).unwrap(), &config).unwrap()
}

fn engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine tick");
    for n_bodies in [100, 1_000, 5_000] {
        group.bench_with_input(
            BenchmarkId::new("single threaded", n_bodies),
            &n_bodies,
            |b, &n_bodies| {
                b.iter_batched_ref(|| setup(n_bodies), |e| e.tick(), BatchSize::LargeInput)
            },
        );

        group.bench_with_input(
            BenchmarkId::new("multithreaded", n_bodies),
            &n_bodies,
            |b, &n_bodies| {
                b.iter_batched_ref(
                    || setup(n_bodies).multithreaded(4),
                    |e| e.tick(),
                    BatchSize::LargeInput,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("rayon", n_bodies),
            &n_bodies,
            |b, &n_bodies| {
                b.iter_batched_ref(
                    || setup(n_bodies).rayon_iter(),
                    |e| e.tick(),
                    BatchSize::LargeInput,
                )
            },
        );
    }
}

fn snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for n_bodies in [100, 1_000, 10_000] {
        let mut creator =
            RandomBodyCreator::with_rng(&SpawnConfig::default(), StdRng::seed_from_u64(1));
        let state = SimulationState::new(n_bodies).unwrap();
        for body in creator.create_bodies(n_bodies).unwrap() {
            state.append(&body);
        }

        let mut bodies = Vec::new();
        group.bench_with_input(BenchmarkId::from_parameter(n_bodies), &state, |b, state| {
            b.iter(|| state.snapshot_into(&mut bodies))
        });
    }
}

criterion_group!(benches, engine_tick, snapshot);
criterion_main!(benches);
