//! Benchmarks for the reaction-diffusion propagator and render pipeline.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use turing_patterns::{
    compute::{CpuPropagator, Propagator, Seeder, SimulationState},
    render::RenderPipeline,
    schema::{Model, RenderSettings, SeedMode, SeedSpec, SimulationParams},
};

fn seeded_state(size: usize) -> SimulationState {
    let mut state = SimulationState::new(size, size).unwrap();
    let cells = Seeder::new(size, size).generate(SeedSpec::new(SeedMode::RandomSpots, 1234.0));
    state.fill_both(&cells).unwrap();
    state
}

fn bench_propagator_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagator_step");
    let params = SimulationParams::default();

    for size in [64, 128, 256, 512, 1024] {
        let mut propagator = CpuPropagator::new();
        let mut state = seeded_state(size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    propagator.step(black_box(&mut state), &params).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("models");

    for model in [Model::GrayScott, Model::FitzHughNagumo, Model::GiererMeinhardt] {
        let params = SimulationParams {
            model,
            ..Default::default()
        };
        let mut propagator = CpuPropagator::new();
        let mut state = seeded_state(256);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", model)),
            &model,
            |b, _| {
                b.iter(|| {
                    propagator.step(black_box(&mut state), &params).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let state = seeded_state(512);

    let plain = RenderSettings::default();
    let post = RenderSettings {
        bloom_enabled: true,
        edge_enabled: true,
        ..Default::default()
    };

    for (name, settings) in [("plain", plain), ("bloom_edge", post)] {
        let mut pipeline = RenderPipeline::new(512, 512);
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(pipeline.render(&state, &settings));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_propagator_step, bench_models, bench_render);
criterion_main!(benches);
